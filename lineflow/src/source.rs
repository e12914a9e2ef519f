// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The text source contract consumed by the engine.

use core::ops::Range;

/// Opaque identifier for a font known to the host's graphics device.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FontId(pub u32);

/// Opaque writing-system identifier.
///
/// Bundles a language/script's rendering configuration on the host side;
/// the engine only carries it across the boundary.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct WritingSystem(pub u32);

/// Style properties constant over one run of text.
///
/// The engine never interprets these beyond equality; they are forwarded to
/// the graphics device, which owns their meaning. `features` is an opaque
/// bit set of font feature selections.
#[derive(Clone, PartialEq, Debug)]
pub struct RunStyle {
    /// The writing system governing this run.
    pub writing_system: WritingSystem,
    /// Font to measure with.
    pub font: FontId,
    /// Font size in the measurement unit.
    pub font_size: f32,
    /// Opaque font feature bits.
    pub features: u32,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self {
            writing_system: WritingSystem(0),
            font: FontId(0),
            font_size: 12.0,
            features: 0,
        }
    }
}

/// A logical paragraph of characters with per-character style and direction
/// metadata, supplied by the host.
///
/// Offsets are in Unicode scalar values. Property ranges partition the
/// paragraph: for any in-bounds `offset`, [`TextSource::property_range`]
/// returns a range containing `offset`, and the ranges returned for
/// consecutive starting offsets tile the paragraph exactly.
///
/// Out-of-bounds offsets are a caller contract violation; implementations
/// may panic.
pub trait TextSource {
    /// Total length of the paragraph in characters.
    fn len(&self) -> usize;

    /// Returns `true` if the paragraph is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the characters of `range` to `out`.
    fn fetch(&self, range: Range<usize>, out: &mut Vec<char>);

    /// Returns `true` if the character at `offset` is in right-to-left text.
    fn is_rtl(&self, offset: usize) -> bool {
        self.bidi_level(offset) & 1 != 0
    }

    /// Bidi embedding depth of the character at `offset`. Even levels are
    /// left-to-right.
    fn bidi_level(&self, offset: usize) -> u8;

    /// The contiguous range with constant style properties containing
    /// `offset`.
    fn property_range(&self, offset: usize) -> Range<usize>;

    /// The style in effect at `offset`.
    fn style(&self, offset: usize) -> RunStyle;
}

#[derive(Clone, Debug)]
struct Span {
    /// Exclusive end offset; the start is the previous span's end.
    end: usize,
    style: RunStyle,
    bidi_level: u8,
}

/// A concrete [`TextSource`] over owned text and style spans.
///
/// Built front to back with [`StyledTextBuilder`]; adjacent spans with equal
/// style and direction are merged so property ranges are maximal.
#[derive(Clone, Debug)]
pub struct StyledText {
    chars: Vec<char>,
    spans: Vec<Span>,
}

impl StyledText {
    /// Creates a single-style left-to-right source.
    pub fn plain(text: &str, style: RunStyle) -> Self {
        let mut builder = StyledTextBuilder::new();
        builder.push(text, style);
        builder.build()
    }

    fn span_index(&self, offset: usize) -> usize {
        debug_assert!(offset < self.chars.len(), "offset {offset} out of bounds");
        self.spans.partition_point(|span| span.end <= offset)
    }
}

impl TextSource for StyledText {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn fetch(&self, range: Range<usize>, out: &mut Vec<char>) {
        out.extend_from_slice(&self.chars[range]);
    }

    fn bidi_level(&self, offset: usize) -> u8 {
        self.spans[self.span_index(offset)].bidi_level
    }

    fn property_range(&self, offset: usize) -> Range<usize> {
        let index = self.span_index(offset);
        let start = if index == 0 {
            0
        } else {
            self.spans[index - 1].end
        };
        start..self.spans[index].end
    }

    fn style(&self, offset: usize) -> RunStyle {
        self.spans[self.span_index(offset)].style.clone()
    }
}

/// Builder for [`StyledText`].
#[derive(Clone, Debug, Default)]
pub struct StyledTextBuilder {
    chars: Vec<char>,
    spans: Vec<Span>,
}

impl StyledTextBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends left-to-right text in the given style.
    pub fn push(&mut self, text: &str, style: RunStyle) -> &mut Self {
        self.push_bidi(text, style, 0)
    }

    /// Appends text at an explicit bidi embedding level.
    pub fn push_bidi(&mut self, text: &str, style: RunStyle, bidi_level: u8) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        self.chars.extend(text.chars());
        match self.spans.last_mut() {
            Some(span) if span.style == style && span.bidi_level == bidi_level => {
                span.end = self.chars.len();
            }
            _ => self.spans.push(Span {
                end: self.chars.len(),
                style,
                bidi_level,
            }),
        }
        self
    }

    /// Finalizes the source.
    pub fn build(self) -> StyledText {
        StyledText {
            chars: self.chars,
            spans: self.spans,
        }
    }
}

/// Iterates maximal sub-ranges of `range` with constant style and bidi
/// level, so style is fetched once per run rather than once per character.
pub(crate) fn style_runs<S: TextSource + ?Sized>(
    source: &S,
    range: Range<usize>,
) -> impl Iterator<Item = (Range<usize>, RunStyle, u8)> + '_ {
    let end = range.end;
    let mut pos = range.start;
    core::iter::from_fn(move || {
        if pos >= end {
            return None;
        }
        let start = pos;
        let prop_end = source.property_range(start).end.min(end);
        let level = source.bidi_level(start);
        let mut run_end = start + 1;
        while run_end < prop_end && source.bidi_level(run_end) == level {
            run_end += 1;
        }
        let style = source.style(start);
        pos = run_end;
        Some((start..run_end, style, level))
    })
}
