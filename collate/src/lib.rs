// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table-driven multi-level collation.
//!
//! This crate generates locale-independent sort keys and compares strings
//! through a simplified Unicode Collation Algorithm: each character maps,
//! via an immutable [`CollationTable`], to one or more collating elements
//! carrying primary/secondary/tertiary weights. Elements may be expansions
//! (one character sorting as a short fixed sequence of weights) or variants
//! (ignorable under default [`CollatingOptions`]). Characters the table does
//! not cover receive deterministic implicit weights derived from the code
//! point, so the resulting order is always total.
//!
//! Deliberate limitations, preserved for sort key stability: combining mark
//! sequences are not canonically reordered, and contractions are not
//! supported.

mod collator;
mod element;
mod error;
mod table;

pub use collator::{CollatingOptions, Collator, SortKey};
pub use element::{LEVEL_SEPARATOR, MIN_WEIGHT, Weights};
pub use error::{Error, ErrorKind, ExpansionInfo};
pub use table::{CollationTable, TableBuilder, default_table};
