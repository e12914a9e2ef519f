// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character classification supplied to the engine.

use icu_normalizer::DecomposingNormalizerBorrowed;
use icu_properties::props::{CanonicalCombiningClass, GeneralCategory, LineBreak};
use icu_properties::{CodePointMapData, CodePointMapDataBorrowed};

/// Line-breaking classification of a single character.
///
/// A coarse projection of the Unicode line-breaking property onto the five
/// classes the breaker distinguishes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LineBreakClass {
    /// Ordinary letter or symbol; offers no break opportunity of its own.
    Letter,
    /// A break is permitted after this character (hyphens and similar).
    Opportunity,
    /// Breakable whitespace. Hangs when it falls at the end of a line.
    Whitespace,
    /// Combining mark; attaches to the preceding base character and never
    /// admits a break before it.
    Combining,
    /// Forces a line break after this character.
    Mandatory,
}

impl LineBreakClass {
    /// Returns `true` for breakable whitespace.
    pub fn is_whitespace(self) -> bool {
        self == Self::Whitespace
    }

    /// Returns `true` if a line may legally end after a character of this
    /// class.
    pub fn allows_break_after(self) -> bool {
        matches!(self, Self::Opportunity | Self::Whitespace | Self::Mandatory)
    }
}

/// Character property lookups consumed by the breaker, segments and
/// (optionally) a collator.
///
/// Implementations must be pure: repeated queries for the same character
/// return the same answer for the life of the process.
pub trait CharacterProperties {
    /// The line-breaking class of `ch`.
    fn line_break_class(&self, ch: char) -> LineBreakClass;

    /// The canonical combining class of `ch` (0 for starters).
    fn combining_class(&self, ch: char) -> u8;

    /// Returns `true` if `ch` is a combining mark (general category M).
    fn is_mark(&self, ch: char) -> bool;

    /// Appends the canonical (NFD) decomposition of `ch` to `out`; appends
    /// `ch` itself if it does not decompose.
    fn decompose(&self, ch: char, out: &mut Vec<char>);
}

/// [`CharacterProperties`] backed by compiled Unicode property data.
#[derive(Debug)]
pub struct UnicodeProperties {
    line_break: CodePointMapDataBorrowed<'static, LineBreak>,
    combining: CodePointMapDataBorrowed<'static, CanonicalCombiningClass>,
    category: CodePointMapDataBorrowed<'static, GeneralCategory>,
    nfd: DecomposingNormalizerBorrowed<'static>,
}

impl UnicodeProperties {
    /// Creates the property engine over compiled data.
    pub fn new() -> Self {
        Self {
            line_break: CodePointMapData::<LineBreak>::new(),
            combining: CodePointMapData::<CanonicalCombiningClass>::new(),
            category: CodePointMapData::<GeneralCategory>::new(),
            nfd: DecomposingNormalizerBorrowed::new_nfd(),
        }
    }
}

impl Default for UnicodeProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterProperties for UnicodeProperties {
    fn line_break_class(&self, ch: char) -> LineBreakClass {
        let lb = self.line_break.get(ch);
        if lb == LineBreak::MandatoryBreak
            || lb == LineBreak::CarriageReturn
            || lb == LineBreak::LineFeed
            || lb == LineBreak::NextLine
        {
            LineBreakClass::Mandatory
        } else if lb == LineBreak::Space {
            LineBreakClass::Whitespace
        } else if lb == LineBreak::BreakAfter
            || lb == LineBreak::BreakBefore
            || lb == LineBreak::Hyphen
            || lb == LineBreak::ZWSpace
        {
            LineBreakClass::Opportunity
        } else if lb == LineBreak::CombiningMark || lb == LineBreak::ZWJ {
            LineBreakClass::Combining
        } else {
            LineBreakClass::Letter
        }
    }

    fn combining_class(&self, ch: char) -> u8 {
        self.combining.get(ch).to_icu4c_value()
    }

    fn is_mark(&self, ch: char) -> bool {
        matches!(
            self.category.get(ch),
            GeneralCategory::NonspacingMark
                | GeneralCategory::SpacingMark
                | GeneralCategory::EnclosingMark
        )
    }

    fn decompose(&self, ch: char, out: &mut Vec<char>) {
        let mut buf = [0u8; 4];
        let decomposed = self.nfd.normalize(ch.encode_utf8(&mut buf));
        out.extend(decomposed.chars());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_characters() {
        let props = UnicodeProperties::new();
        assert_eq!(props.line_break_class('a'), LineBreakClass::Letter);
        assert_eq!(props.line_break_class(' '), LineBreakClass::Whitespace);
        assert_eq!(props.line_break_class('\n'), LineBreakClass::Mandatory);
        assert_eq!(props.line_break_class('\r'), LineBreakClass::Mandatory);
        assert_eq!(props.line_break_class('-'), LineBreakClass::Opportunity);
        assert_eq!(
            props.line_break_class('\u{0301}'),
            LineBreakClass::Combining
        );
    }

    #[test]
    fn combining_marks_are_marks() {
        let props = UnicodeProperties::new();
        assert!(props.is_mark('\u{0301}'));
        assert!(props.combining_class('\u{0301}') > 0);
        assert!(!props.is_mark('a'));
        assert_eq!(props.combining_class('a'), 0);
    }

    #[test]
    fn decompose_splits_precomposed_letters() {
        let props = UnicodeProperties::new();
        let mut out = Vec::new();
        props.decompose('\u{00E9}', &mut out);
        assert_eq!(out, ['e', '\u{0301}']);
        out.clear();
        props.decompose('x', &mut out);
        assert_eq!(out, ['x']);
    }

    #[test]
    fn break_after_policy() {
        assert!(LineBreakClass::Whitespace.allows_break_after());
        assert!(LineBreakClass::Mandatory.allows_break_after());
        assert!(!LineBreakClass::Letter.allows_break_after());
        assert!(!LineBreakClass::Combining.allows_break_after());
    }
}
