// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sort key generation and comparison.

use std::cmp::Ordering;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::element::{LEVEL_SEPARATOR, Level, MIN_WEIGHT, RawElement, Weights};
use crate::error::Error;
use crate::table::CollationTable;

/// Options controlling sort key generation and comparison.
///
/// Two strings compare equal iff their sort keys generated with the same
/// options are byte-identical.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CollatingOptions {
    /// When `true` (the default), variant elements are skipped entirely;
    /// when `false`, each contributes the lowest valid weight at the levels
    /// it is visible on, making its position significant.
    pub ignore_variants: bool,
}

impl Default for CollatingOptions {
    fn default() -> Self {
        Self {
            ignore_variants: true,
        }
    }
}

/// An exportable, memcmp-orderable sort key.
///
/// Weights are encoded big-endian so byte-wise comparison of keys agrees
/// with weight-wise comparison.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct SortKey {
    bytes: Vec<u8>,
}

impl SortKey {
    /// The key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the key, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A table-driven multi-level collator.
///
/// The collator follows an explicit open lifecycle: it must be given an
/// element table via [`Collator::open`] (or constructed with
/// [`Collator::with_default_table`]) before it can generate keys or compare
/// strings. Querying an unopened collator fails fast with
/// [`ErrorKind::NotInitialized`] rather than returning empty keys.
///
/// Known, deliberate departures from the full Unicode Collation Algorithm:
/// combining mark sequences are not canonically reordered, and contractions
/// (many characters to one element) are unsupported. Changing either would
/// invalidate persisted sort keys.
///
/// [`ErrorKind::NotInitialized`]: crate::ErrorKind::NotInitialized
#[derive(Clone, Debug, Default)]
pub struct Collator {
    table: Option<Arc<CollationTable>>,
}

impl Collator {
    /// Creates a collator with no element table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collator over the compiled-in default table.
    pub fn with_default_table() -> Self {
        Self {
            table: Some(crate::table::default_table()),
        }
    }

    /// Supplies the element table, replacing any previous one.
    pub fn open(&mut self, table: Arc<CollationTable>) {
        self.table = Some(table);
    }

    /// Drops the element table, returning the collator to its unopened
    /// state.
    pub fn close(&mut self) {
        self.table = None;
    }

    /// Returns `true` if the collator has an element table.
    pub fn is_open(&self) -> bool {
        self.table.is_some()
    }

    fn table(&self) -> Result<&CollationTable, Error> {
        self.table.as_deref().ok_or_else(Error::not_initialized)
    }

    /// Generates the sort key for `text`.
    ///
    /// The key is the concatenation of all primary weights, a level
    /// separator, all secondary weights, another separator, and all tertiary
    /// weights. Generation is deterministic for fixed options.
    pub fn sort_key(&self, text: &str, options: CollatingOptions) -> Result<SortKey, Error> {
        let table = self.table()?;
        let mut levels: [Vec<u16>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut elements = SmallVec::<[RawElement; 4]>::new();
        for ch in text.chars() {
            elements.clear();
            resolve(table, ch, &mut elements)?;
            for &e in &elements {
                for (level, buf) in Level::ALL.iter().zip(levels.iter_mut()) {
                    if let Some(w) = weight_at(e, *level, options) {
                        buf.push(w);
                    }
                }
            }
        }

        let [primaries, secondaries, tertiaries] = levels;
        let mut bytes =
            Vec::with_capacity(2 * (primaries.len() + secondaries.len() + tertiaries.len() + 2));
        for w in primaries {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        bytes.extend_from_slice(&LEVEL_SEPARATOR.to_be_bytes());
        for w in secondaries {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        bytes.extend_from_slice(&LEVEL_SEPARATOR.to_be_bytes());
        for w in tertiaries {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        Ok(SortKey { bytes })
    }

    /// Compares two strings.
    ///
    /// Weights are streamed level by level without materializing keys; the
    /// result is identical to byte-comparing the two sort keys generated
    /// with the same options.
    pub fn compare(
        &self,
        s1: &str,
        s2: &str,
        options: CollatingOptions,
    ) -> Result<Ordering, Error> {
        let table = self.table()?;
        for level in Level::ALL {
            let mut a = WeightStream::new(table, s1, level, options);
            let mut b = WeightStream::new(table, s2, level, options);
            loop {
                match (a.next_weight()?, b.next_weight()?) {
                    (Some(wa), Some(wb)) => match wa.cmp(&wb) {
                        Ordering::Equal => {}
                        unequal => return Ok(unequal),
                    },
                    (Some(_), None) => return Ok(Ordering::Greater),
                    (None, Some(_)) => return Ok(Ordering::Less),
                    (None, None) => break,
                }
            }
        }
        Ok(Ordering::Equal)
    }
}

/// Expands `ch` into its collating elements.
///
/// Unassigned characters receive a two-element implicit weighting derived
/// from the code point, so the ordering is total and reproducible even for
/// private-use characters. Variant status propagates from an expansion entry
/// to its sub-elements.
fn resolve(
    table: &CollationTable,
    ch: char,
    out: &mut SmallVec<[RawElement; 4]>,
) -> Result<(), Error> {
    match table.element(ch) {
        Some(e) if e.is_expansion() => {
            let variant_flag = e.flags & crate::element::VARIANT;
            for &part in table.expansion_parts(ch, e)? {
                let mut part = part;
                part.flags |= variant_flag;
                out.push(part);
            }
        }
        Some(e) => out.push(e),
        None => {
            let cp = ch as u32;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "cp <= 0x10FFFF keeps both halves within u16"
            )]
            let (lead, trail) = (
                (0xFB40 + (cp >> 15)) as u16,
                ((cp & 0x7FFF) | 0x8000) as u16,
            );
            out.push(RawElement::weights(
                Weights::new(lead, 0, MIN_WEIGHT),
                crate::element::ASSIGNED,
            ));
            out.push(RawElement::weights(
                Weights::new(trail, 0, 0),
                crate::element::ASSIGNED,
            ));
        }
    }
    Ok(())
}

/// The weight `e` contributes at `level`, or `None` if it is invisible
/// there.
///
/// Variant elements are skipped entirely when variants are ignored.
/// Otherwise they contribute the placeholder [`MIN_WEIGHT`] at each level
/// where they carry a nonzero weight, or at the tertiary level alone when
/// they are all-zero, so their position in the string stays significant.
fn weight_at(e: RawElement, level: Level, options: CollatingOptions) -> Option<u16> {
    let w = e.to_weights();
    if e.is_variant() {
        if options.ignore_variants {
            return None;
        }
        if w.is_zero() {
            return (level == Level::Tertiary).then_some(MIN_WEIGHT);
        }
        return (w.level(level) != 0).then_some(MIN_WEIGHT);
    }
    let v = w.level(level);
    (v != 0).then_some(v)
}

/// Streams the weights of one string at one level.
struct WeightStream<'a> {
    table: &'a CollationTable,
    chars: core::str::Chars<'a>,
    level: Level,
    options: CollatingOptions,
    pending: SmallVec<[u16; 8]>,
    pos: usize,
}

impl<'a> WeightStream<'a> {
    fn new(table: &'a CollationTable, text: &'a str, level: Level, options: CollatingOptions) -> Self {
        Self {
            table,
            chars: text.chars(),
            level,
            options,
            pending: SmallVec::new(),
            pos: 0,
        }
    }

    fn next_weight(&mut self) -> Result<Option<u16>, Error> {
        loop {
            if let Some(&w) = self.pending.get(self.pos) {
                self.pos += 1;
                return Ok(Some(w));
            }
            let Some(ch) = self.chars.next() else {
                return Ok(None);
            };
            self.pending.clear();
            self.pos = 0;
            let mut elements = SmallVec::<[RawElement; 4]>::new();
            resolve(self.table, ch, &mut elements)?;
            for &e in &elements {
                if let Some(w) = weight_at(e, self.level, self.options) {
                    self.pending.push(w);
                }
            }
        }
    }
}
