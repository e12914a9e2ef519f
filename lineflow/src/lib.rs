// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph segmentation and measurement for hosted text rendering.
//!
//! Lineflow turns a host-supplied paragraph (a [`TextSource`]) into
//! [`Segment`]s: immutable slices of text laid out against a width budget.
//! The host supplies the two capabilities the engine cannot own — glyph
//! measurement through [`GraphicsDevice`] and character classification
//! through [`CharacterProperties`] — and the engine supplies line breaking,
//! width and extent queries, hit testing, caret movement and justification
//! stretch.
//!
//! The typical flow:
//!
//! 1. Build an [`EngineContext`] (once) and a [`TextSource`] for the
//!    paragraph, for example with [`StyledTextBuilder`].
//! 2. Call [`SegmentBuilder::build_line`] repeatedly, feeding each break
//!    back in as the next line's start, until the paragraph is consumed.
//! 3. Query the resulting segments for geometry and carets.
//!
//! All offsets are in Unicode scalar values. The engine holds no global
//! state; everything flows through the context and the two capabilities.

pub mod analysis;
pub mod breaker;
pub mod context;
pub mod graphics;
pub mod segment;
pub mod source;
pub mod stretch;

#[cfg(test)]
mod tests;

pub use analysis::{CharacterProperties, LineBreakClass, UnicodeProperties};
pub use breaker::{BreakPoint, BreakReason, BreakWeight, LineBreaker};
pub use context::EngineContext;
pub use graphics::{GraphicsDevice, MeasureError, RunMetrics};
pub use segment::{HitPoint, InsertionValidity, Segment, SegmentBuilder};
pub use source::{FontId, RunStyle, StyledText, StyledTextBuilder, TextSource, WritingSystem};
