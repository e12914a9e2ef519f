// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable collating-element tables.

use std::sync::{Arc, OnceLock};

use crate::element::{EXPANSION, MIN_WEIGHT, RawElement, REORDERED, VARIANT, Weights};
use crate::error::Error;

const PAGE_SIZE: usize = 256;

type Page = [RawElement; PAGE_SIZE];

/// An immutable table mapping characters to collating elements.
///
/// Lookup goes through a two-level page table (page index, then offset
/// within the page) so memory stays bounded over the full code point range
/// while lookup remains O(1). Characters without an assigned entry fall back
/// to deterministic implicit weights derived from the code point; that
/// fallback lives in the collator, not here.
///
/// Tables are built once via [`TableBuilder`] and never mutated, so a table
/// behind an [`Arc`] is freely shareable across threads.
#[derive(Debug)]
pub struct CollationTable {
    pages: Vec<Option<Box<Page>>>,
    expansions: Vec<RawElement>,
}

impl CollationTable {
    /// Returns the assigned element for `ch`, or `None` if the table does
    /// not cover it.
    pub(crate) fn element(&self, ch: char) -> Option<RawElement> {
        let cp = ch as usize;
        let page = self.pages.get(cp / PAGE_SIZE)?.as_ref()?;
        let e = page[cp % PAGE_SIZE];
        e.is_assigned().then_some(e)
    }

    /// Resolves the sub-elements of an expansion entry.
    ///
    /// An out-of-range reference means the table data is corrupt; this is
    /// reported rather than truncated so a bad table cannot silently produce
    /// misordered keys.
    pub(crate) fn expansion_parts(&self, ch: char, e: RawElement) -> Result<&[RawElement], Error> {
        debug_assert!(e.is_expansion(), "entry for {ch:?} is not an expansion");
        let index = e.primary as usize;
        let count = e.secondary as usize;
        self.expansions
            .get(index..index + count)
            .ok_or_else(|| Error::corrupt_expansion(ch, index, count, self.expansions.len()))
    }

    /// The number of characters with assigned entries.
    pub fn len(&self) -> usize {
        self.pages
            .iter()
            .flatten()
            .map(|page| page.iter().filter(|e| e.is_assigned()).count())
            .sum()
    }

    /// Returns `true` if no characters have assigned entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builder for a [`CollationTable`].
///
/// Weights are validated as they are registered: a nonzero weight must be at
/// least [`MIN_WEIGHT`] so it can never collide with the level separator.
#[derive(Debug, Default)]
pub struct TableBuilder {
    pages: Vec<Option<Box<Page>>>,
    expansions: Vec<RawElement>,
}

impl TableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns plain weights to `ch`.
    pub fn weights(&mut self, ch: char, w: Weights) -> Result<&mut Self, Error> {
        validate(ch, w)?;
        self.set(ch, RawElement::weights(w, 0));
        Ok(self)
    }

    /// Assigns weights to `ch` and flags it as a variant (ignorable under
    /// default options).
    pub fn variant(&mut self, ch: char, w: Weights) -> Result<&mut Self, Error> {
        validate(ch, w)?;
        self.set(ch, RawElement::weights(w, VARIANT));
        Ok(self)
    }

    /// Assigns an all-zero variant element to `ch`, making it fully
    /// invisible to collation under default options.
    pub fn ignorable(&mut self, ch: char) -> &mut Self {
        self.set(ch, RawElement::weights(Weights::default(), VARIANT));
        self
    }

    /// Assigns weights to `ch` with the reordered flag set.
    pub fn reordered(&mut self, ch: char, w: Weights) -> Result<&mut Self, Error> {
        validate(ch, w)?;
        self.set(ch, RawElement::weights(w, REORDERED));
        Ok(self)
    }

    /// Maps `ch` to a fixed sequence of weight triples.
    ///
    /// The sub-elements are stored in a shared pool and the entry for `ch`
    /// records an index and count, so expansions can never chain.
    pub fn expansion(&mut self, ch: char, parts: &[Weights]) -> Result<&mut Self, Error> {
        let index = self.expansions.len();
        if parts.is_empty()
            || index + parts.len() > u16::MAX as usize
            || parts.len() > u16::MAX as usize
        {
            return Err(Error::expansion_too_large(ch, parts.len()));
        }
        for &w in parts {
            validate(ch, w)?;
        }
        self.expansions
            .extend(parts.iter().map(|&w| RawElement::weights(w, 0)));
        #[expect(clippy::cast_possible_truncation, reason = "bounds checked above")]
        self.set(
            ch,
            RawElement::expansion(index as u16, parts.len() as u16, EXPANSION),
        );
        Ok(self)
    }

    /// Finalizes the table.
    pub fn build(self) -> CollationTable {
        CollationTable {
            pages: self.pages,
            expansions: self.expansions,
        }
    }

    fn set(&mut self, ch: char, e: RawElement) {
        let cp = ch as usize;
        let page_index = cp / PAGE_SIZE;
        if self.pages.len() <= page_index {
            self.pages.resize_with(page_index + 1, || None);
        }
        let page = self.pages[page_index]
            .get_or_insert_with(|| Box::new([RawElement::default(); PAGE_SIZE]));
        page[cp % PAGE_SIZE] = e;
    }
}

fn validate(ch: char, w: Weights) -> Result<(), Error> {
    for v in [w.primary, w.secondary, w.tertiary] {
        if v != 0 && v < MIN_WEIGHT {
            return Err(Error::invalid_weight(ch));
        }
    }
    Ok(())
}

// Weight layout of the built-in table. Primaries leave gaps between letters
// for future tailoring. Tertiary distinguishes case and marks; the values
// stay clear of MIN_WEIGHT, which doubles as the unignored-variant
// placeholder.
const PRIMARY_SPACE: u16 = 0x0201;
const PRIMARY_PUNCT: u16 = 0x0220;
const PRIMARY_DIGIT: u16 = 0x0300;
const PRIMARY_LETTER: u16 = 0x1000;
const LETTER_GAP: u16 = 0x0020;
const TERTIARY_LOWER: u16 = 0x0004;
const TERTIARY_UPPER: u16 = 0x0008;

const fn lower(letter: u8) -> Weights {
    Weights::new(
        PRIMARY_LETTER + (letter - b'a') as u16 * LETTER_GAP,
        0,
        TERTIARY_LOWER,
    )
}

const fn upper(letter: u8) -> Weights {
    Weights::new(
        PRIMARY_LETTER + (letter - b'a') as u16 * LETTER_GAP,
        0,
        TERTIARY_UPPER,
    )
}

const fn mark(tertiary: u16) -> Weights {
    Weights::new(0, 0, tertiary)
}

const ACUTE: Weights = mark(0x0010);
const GRAVE: Weights = mark(0x0011);
const CIRCUMFLEX: Weights = mark(0x0012);
const TILDE: Weights = mark(0x0013);
const DIAERESIS: Weights = mark(0x0014);
const RING: Weights = mark(0x0015);
const CEDILLA: Weights = mark(0x0016);

/// The compiled-in default table.
///
/// Latin-oriented: ASCII letters, digits and common punctuation carry direct
/// weights; combining marks carry tertiary-only weights; precomposed accented
/// letters and a few ligatures are expansions over their base sequences;
/// zero-width format characters and a couple of overlay marks are variants.
/// Built on first use and shared for the life of the process.
pub fn default_table() -> Arc<CollationTable> {
    static TABLE: OnceLock<Arc<CollationTable>> = OnceLock::new();
    Arc::clone(TABLE.get_or_init(|| Arc::new(build_default_table())))
}

impl TableBuilder {
    // Registration for the compiled-in literals below. Checked in debug
    // builds; a rejected entry is dropped, and its character falls back to
    // implicit weights.
    fn preset(&mut self, ch: char, w: Weights) {
        let registered = self.weights(ch, w).is_ok();
        debug_assert!(registered, "invalid built-in weights for {ch:?}");
    }

    fn preset_variant(&mut self, ch: char, w: Weights) {
        let registered = self.variant(ch, w).is_ok();
        debug_assert!(registered, "invalid built-in variant for {ch:?}");
    }

    fn preset_expansion(&mut self, ch: char, parts: &[Weights]) {
        let registered = self.expansion(ch, parts).is_ok();
        debug_assert!(registered, "invalid built-in expansion for {ch:?}");
    }
}

fn build_default_table() -> CollationTable {
    let mut b = TableBuilder::new();
    build_default_entries(&mut b);
    b.build()
}

fn build_default_entries(b: &mut TableBuilder) {
    b.preset(' ', Weights::new(PRIMARY_SPACE, 0, TERTIARY_LOWER));
    for (i, ch) in (0u16..).zip(['-', '\'', ',', '.', ';', ':']) {
        b.preset(ch, Weights::new(PRIMARY_PUNCT + i, 0, TERTIARY_LOWER));
    }
    for d in 0u8..10 {
        let ch = char::from(b'0' + d);
        b.preset(
            ch,
            Weights::new(PRIMARY_DIGIT + u16::from(d) * 4, 0, TERTIARY_LOWER),
        );
    }
    for letter in b'a'..=b'z' {
        b.preset(char::from(letter), lower(letter));
        b.preset(char::from(letter.to_ascii_uppercase()), upper(letter));
    }

    // Combining marks: tertiary-only, significant by default.
    b.preset('\u{0301}', ACUTE);
    b.preset('\u{0300}', GRAVE);
    b.preset('\u{0302}', CIRCUMFLEX);
    b.preset('\u{0303}', TILDE);
    b.preset('\u{0308}', DIAERESIS);
    b.preset('\u{030A}', RING);
    b.preset('\u{0327}', CEDILLA);

    // Precomposed Latin letters sort as base letter plus mark.
    let accented: &[(char, u8, Weights)] = &[
        ('\u{00E1}', b'a', ACUTE),
        ('\u{00E0}', b'a', GRAVE),
        ('\u{00E2}', b'a', CIRCUMFLEX),
        ('\u{00E3}', b'a', TILDE),
        ('\u{00E4}', b'a', DIAERESIS),
        ('\u{00E5}', b'a', RING),
        ('\u{00E7}', b'c', CEDILLA),
        ('\u{00E9}', b'e', ACUTE),
        ('\u{00E8}', b'e', GRAVE),
        ('\u{00EA}', b'e', CIRCUMFLEX),
        ('\u{00EB}', b'e', DIAERESIS),
        ('\u{00ED}', b'i', ACUTE),
        ('\u{00EC}', b'i', GRAVE),
        ('\u{00EE}', b'i', CIRCUMFLEX),
        ('\u{00EF}', b'i', DIAERESIS),
        ('\u{00F1}', b'n', TILDE),
        ('\u{00F3}', b'o', ACUTE),
        ('\u{00F2}', b'o', GRAVE),
        ('\u{00F4}', b'o', CIRCUMFLEX),
        ('\u{00F5}', b'o', TILDE),
        ('\u{00F6}', b'o', DIAERESIS),
        ('\u{00FA}', b'u', ACUTE),
        ('\u{00F9}', b'u', GRAVE),
        ('\u{00FB}', b'u', CIRCUMFLEX),
        ('\u{00FC}', b'u', DIAERESIS),
        ('\u{00FD}', b'y', ACUTE),
    ];
    for &(ch, base, accent) in accented {
        b.preset_expansion(ch, &[lower(base), accent]);
    }
    let accented_upper: &[(char, u8, Weights)] = &[
        ('\u{00C1}', b'a', ACUTE),
        ('\u{00C9}', b'e', ACUTE),
        ('\u{00D6}', b'o', DIAERESIS),
        ('\u{00DC}', b'u', DIAERESIS),
    ];
    for &(ch, base, accent) in accented_upper {
        b.preset_expansion(ch, &[upper(base), accent]);
    }

    // Ligatures sort as their spelled-out sequences.
    b.preset_expansion('\u{00E6}', &[lower(b'a'), lower(b'e')]);
    b.preset_expansion('\u{00C6}', &[upper(b'a'), upper(b'e')]);
    b.preset_expansion('\u{0153}', &[lower(b'o'), lower(b'e')]);
    b.preset_expansion('\u{FB01}', &[lower(b'f'), lower(b'i')]);
    b.preset_expansion('\u{FB02}', &[lower(b'f'), lower(b'l')]);

    // Variants: skipped entirely under default options.
    b.preset_variant('\u{00AD}', mark(0x0019));
    b.preset_variant('\u{0334}', mark(0x001A));
    b.preset_variant('\u{0335}', mark(0x001B));
    b.ignorable('\u{200B}');
    b.ignorable('\u{200C}');
    b.ignorable('\u{200D}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn lookup_hits_assigned_entries_only() {
        let mut b = TableBuilder::new();
        b.weights('a', Weights::new(0x1000, 0, 4)).unwrap();
        let table = b.build();
        assert!(table.element('a').is_some());
        assert!(table.element('b').is_none());
        assert!(table.element('\u{4E00}').is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn pages_cover_high_code_points() {
        let mut b = TableBuilder::new();
        b.weights('\u{10FFFD}', Weights::new(0x2000, 0, 4)).unwrap();
        let table = b.build();
        assert!(table.element('\u{10FFFD}').is_some());
        assert!(table.element('\u{10FFFC}').is_none());
    }

    #[test]
    fn weight_below_minimum_is_rejected() {
        let mut b = TableBuilder::new();
        let err = b.weights('a', Weights::new(1, 0, 0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidWeight);
        assert_eq!(err.character(), Some('a'));
    }

    #[test]
    fn empty_expansion_is_rejected() {
        let mut b = TableBuilder::new();
        let err = b.expansion('x', &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExpansionTooLarge);
    }

    #[test]
    fn expansion_parts_round_trip() {
        let mut b = TableBuilder::new();
        let parts = [Weights::new(0x1000, 0, 4), Weights::new(0x1100, 0, 4)];
        b.expansion('x', &parts).unwrap();
        let table = b.build();
        let e = table.element('x').unwrap();
        assert!(e.is_expansion());
        let resolved = table.expansion_parts('x', e).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].to_weights(), parts[0]);
        assert_eq!(resolved[1].to_weights(), parts[1]);
    }

    #[test]
    fn default_table_is_shared() {
        let a = default_table();
        let b = default_table();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.is_empty());
    }

    #[test]
    fn default_table_maps_expected_classes() {
        let t = default_table();
        assert!(t.element('q').unwrap().to_weights().primary >= PRIMARY_LETTER);
        assert!(t.element('\u{00E9}').unwrap().is_expansion());
        assert!(t.element('\u{00AD}').unwrap().is_variant());
        assert!(t.element('\u{200B}').unwrap().to_weights().is_zero());
    }
}
