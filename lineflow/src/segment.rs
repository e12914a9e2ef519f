// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable laid-out segments and their query surface.

use core::fmt;
use core::ops::Range;

use smallvec::SmallVec;

use crate::analysis::CharacterProperties;
use crate::breaker::{BreakPoint, BreakReason, BreakWeight, LineBreaker};
use crate::context::EngineContext;
use crate::graphics::{GraphicsDevice, MeasureError, RunMetrics};
use crate::source::{TextSource, style_runs};
use crate::stretch::{classify, distribute};

/// Creates [`Segment`]s over one text source.
pub struct SegmentBuilder<'a, S: TextSource + ?Sized, P: CharacterProperties> {
    ctx: &'a EngineContext<P>,
    source: &'a S,
}

impl<'a, S: TextSource + ?Sized, P: CharacterProperties> SegmentBuilder<'a, S, P> {
    /// Creates a builder.
    pub fn new(ctx: &'a EngineContext<P>, source: &'a S) -> Self {
        Self { ctx, source }
    }

    /// Runs the line breaker from `start` against `max_width` and
    /// materializes the resulting segment.
    ///
    /// `start_weight` is the weight of the boundary the previous segment
    /// ended with ([`BreakWeight::Mandatory`] at a paragraph start).
    pub fn build_line(
        &self,
        graphics: &dyn GraphicsDevice,
        start: usize,
        max_width: f32,
        start_weight: BreakWeight,
        is_line_start: bool,
    ) -> Result<Segment<'a, S, P>, MeasureError> {
        let mut breaker = LineBreaker::new(self.ctx, self.source);
        let BreakPoint {
            offset,
            weight,
            reason,
        } = breaker.find_break(
            graphics,
            start..self.source.len(),
            max_width,
            false,
            is_line_start,
        )?;
        let ends_line = reason != BreakReason::None || offset == self.source.len();
        Ok(self.build(start, offset - start, start_weight, weight, reason, ends_line))
    }

    /// Materializes a segment for an explicitly chosen range.
    ///
    /// Construction is cheap: nothing is measured until the first
    /// measurement-dependent query.
    pub fn build(
        &self,
        start: usize,
        len: usize,
        start_weight: BreakWeight,
        end_weight: BreakWeight,
        reason: BreakReason,
        ends_line: bool,
    ) -> Segment<'a, S, P> {
        debug_assert!(start + len <= self.source.len(), "segment out of bounds");
        let bidi_level = if len > 0 { self.source.bidi_level(start) } else { 0 };
        Segment {
            ctx: self.ctx,
            source: self.source,
            start,
            len,
            start_weight,
            end_weight,
            reason,
            ends_line,
            bidi_level,
            stretch: 0,
            state: MeasureState::Unmeasured,
        }
    }
}

impl<S: TextSource + ?Sized, P: CharacterProperties> fmt::Debug for SegmentBuilder<'_, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentBuilder")
            .field("source_len", &self.source.len())
            .finish()
    }
}

/// Validity of a proposed insertion point within a segment.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InsertionValidity {
    /// A fine place for the caret.
    Valid,
    /// Legal, but a better position exists (for example a mid-word segment
    /// edge); arrow movement skips these, selection extension does not.
    NotPreferred,
    /// Inside a cluster (between a base character and its combining mark);
    /// the caret may never rest here.
    Invalid,
}

/// Result of hit-testing a point against a segment.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct HitPoint {
    /// Character offset of the insertion point.
    pub offset: usize,
    /// Whether the caret associates with the logically preceding character.
    /// Resolves the ambiguity of a click on a boundary between runs of
    /// different direction.
    pub associate_previous: bool,
}

/// Lazily computed layout of a segment.
struct Measured {
    /// Visible width; trailing whitespace excluded.
    width: f32,
    /// Advance width including trailing whitespace.
    full_width: f32,
    ascent: f32,
    descent: f32,
    leading: f32,
    runs: Vec<RunGeometry>,
}

impl Measured {
    fn height(&self) -> f32 {
        self.ascent + self.descent + self.leading
    }
}

/// One measured style run within a segment.
struct RunGeometry {
    range: Range<usize>,
    bidi_level: u8,
    advances: Vec<f32>,
}

enum MeasureState {
    Unmeasured,
    Measured(Box<Measured>),
    /// The range or direction changed after measurement; cached run
    /// boundaries no longer correspond and everything is recomputed on the
    /// next query.
    Stale,
}

/// An immutable slice of one paragraph, laid out for a chosen width.
///
/// A segment records its character range, the weights of the boundaries at
/// both ends, and direction info. Width, height and run geometry are
/// computed on first query and memoized; [`Segment::set_lim`] and
/// [`Segment::set_direction_info`] invalidate the cache without rebuilding
/// the segment. Edits to the underlying text require building a new segment.
///
/// Measurement-dependent queries take `&mut self` for the cache; a segment
/// is freely shareable for reads once measured and left alone.
pub struct Segment<'a, S: TextSource + ?Sized, P: CharacterProperties> {
    ctx: &'a EngineContext<P>,
    source: &'a S,
    start: usize,
    len: usize,
    start_weight: BreakWeight,
    end_weight: BreakWeight,
    reason: BreakReason,
    ends_line: bool,
    bidi_level: u8,
    stretch: i32,
    state: MeasureState,
}

impl<S: TextSource + ?Sized, P: CharacterProperties> Segment<'_, S, P> {
    /// The segment's character range in the source.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// First character offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the segment covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Weight of the boundary the segment starts at.
    pub fn start_weight(&self) -> BreakWeight {
        self.start_weight
    }

    /// Weight of the boundary the segment ends at.
    pub fn end_weight(&self) -> BreakWeight {
        self.end_weight
    }

    /// Why the segment ends where it does.
    pub fn break_reason(&self) -> BreakReason {
        self.reason
    }

    /// Returns `true` if the segment ends its visual line.
    pub fn ends_line(&self) -> bool {
        self.ends_line
    }

    /// Returns `true` if the segment's base direction is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.bidi_level & 1 != 0
    }

    /// The segment's base bidi embedding depth.
    pub fn bidi_level(&self) -> u8 {
        self.bidi_level
    }

    /// Returns `true` if layout values are currently cached.
    pub fn is_measured(&self) -> bool {
        matches!(self.state, MeasureState::Measured(_))
    }

    /// Narrows or widens the segment to `len` characters without a full
    /// rebuild. Cached layout is discarded and recomputed on the next
    /// query.
    pub fn set_lim(&mut self, len: usize) {
        debug_assert!(self.start + len <= self.source.len(), "lim out of bounds");
        if len != self.len {
            self.len = len;
            self.state = MeasureState::Stale;
        }
    }

    /// Overrides the segment's base direction. Cached layout is discarded.
    pub fn set_direction_info(&mut self, bidi_level: u8) {
        if bidi_level != self.bidi_level {
            self.bidi_level = bidi_level;
            self.state = MeasureState::Stale;
        }
    }

    /// The total stretch assigned for justification.
    pub fn stretch(&self) -> i32 {
        self.stretch
    }

    /// Assigns the stretch budget this segment must absorb when justified.
    pub fn set_stretch(&mut self, stretch: i32) {
        self.stretch = stretch;
    }

    /// Splits the stretch budget across the segment's glyphs.
    ///
    /// Letters receive nothing, diacritic-adjacent gaps a little, and
    /// inter-word whitespace the most; the pieces sum to exactly the
    /// assigned stretch.
    pub fn stretch_values(&self) -> Vec<i32> {
        let mut chars = Vec::with_capacity(self.len);
        self.source.fetch(self.range(), &mut chars);
        let classes = classify(self.ctx.properties(), &chars);
        distribute(self.stretch, &classes)
    }

    /// Visible width: advance widths of all runs, minus trailing
    /// whitespace.
    pub fn width(&mut self, graphics: &dyn GraphicsDevice) -> Result<f32, MeasureError> {
        self.ensure_measured(graphics)?;
        Ok(self.measured().width)
    }

    /// Advance width including trailing whitespace.
    pub fn full_width(&mut self, graphics: &dyn GraphicsDevice) -> Result<f32, MeasureError> {
        self.ensure_measured(graphics)?;
        Ok(self.measured().full_width)
    }

    /// Visible width and height.
    ///
    /// Height is the maximum over the segment's runs, so differently sized
    /// styles share one baseline.
    pub fn extent(&mut self, graphics: &dyn GraphicsDevice) -> Result<(f32, f32), MeasureError> {
        self.ensure_measured(graphics)?;
        let m = self.measured();
        Ok((m.width, m.height()))
    }

    /// Distance from the top of the segment to the baseline.
    pub fn ascent(&mut self, graphics: &dyn GraphicsDevice) -> Result<f32, MeasureError> {
        self.ensure_measured(graphics)?;
        Ok(self.measured().ascent)
    }

    /// Finds the insertion point nearest to `x`, in segment-relative
    /// coordinates.
    pub fn point_to_char(
        &mut self,
        graphics: &dyn GraphicsDevice,
        x: f32,
    ) -> Result<HitPoint, MeasureError> {
        self.ensure_measured(graphics)?;
        let m = self.measured();
        if m.runs.is_empty() {
            return Ok(HitPoint {
                offset: self.start,
                associate_previous: false,
            });
        }
        let mut edge = 0.0f32;
        let mut last = HitPoint {
            offset: self.start,
            associate_previous: false,
        };
        for &ri in &visual_order(&m.runs) {
            let run = &m.runs[ri];
            let rtl = run.bidi_level & 1 != 0;
            for k in 0..run.range.len() {
                let li = if rtl {
                    run.range.end - 1 - k
                } else {
                    run.range.start + k
                };
                let advance = run.advances[li - run.range.start];
                if x < edge + advance {
                    let leading = x <= edge + advance * 0.5;
                    return Ok(hit(li, rtl, leading));
                }
                edge += advance;
            }
            // Caret at the trailing visual edge of the run.
            last = if rtl {
                HitPoint {
                    offset: run.range.start,
                    associate_previous: false,
                }
            } else {
                HitPoint {
                    offset: run.range.end,
                    associate_previous: true,
                }
            };
        }
        Ok(last)
    }

    /// The x position of the caret at `offset`, in segment-relative
    /// coordinates. At a boundary between runs of different direction the
    /// first visual occurrence wins.
    pub fn char_to_point(
        &mut self,
        graphics: &dyn GraphicsDevice,
        offset: usize,
    ) -> Result<f32, MeasureError> {
        debug_assert!(
            offset >= self.start && offset <= self.start + self.len,
            "offset outside segment"
        );
        self.ensure_measured(graphics)?;
        let m = self.measured();
        let mut edge = 0.0f32;
        for &ri in &visual_order(&m.runs) {
            let run = &m.runs[ri];
            let rtl = run.bidi_level & 1 != 0;
            for k in 0..run.range.len() {
                let li = if rtl {
                    run.range.end - 1 - k
                } else {
                    run.range.start + k
                };
                let left_caret = if rtl { li + 1 } else { li };
                if offset == left_caret {
                    return Ok(edge);
                }
                edge += run.advances[li - run.range.start];
            }
            let right_caret = if rtl { run.range.start } else { run.range.end };
            if offset == right_caret {
                return Ok(edge);
            }
        }
        Ok(edge)
    }

    /// The highlight rectangles (as x intervals) covering the characters of
    /// `range`, in visual order. Visually contiguous characters coalesce
    /// into one interval, so a range crossing a direction boundary yields
    /// several.
    pub fn range_extents(
        &mut self,
        graphics: &dyn GraphicsDevice,
        range: Range<usize>,
    ) -> Result<Vec<(f32, f32)>, MeasureError> {
        self.ensure_measured(graphics)?;
        let m = self.measured();
        let mut out: Vec<(f32, f32)> = Vec::new();
        let mut edge = 0.0f32;
        for &ri in &visual_order(&m.runs) {
            let run = &m.runs[ri];
            let rtl = run.bidi_level & 1 != 0;
            for k in 0..run.range.len() {
                let li = if rtl {
                    run.range.end - 1 - k
                } else {
                    run.range.start + k
                };
                let advance = run.advances[li - run.range.start];
                if range.contains(&li) {
                    match out.last_mut() {
                        Some(interval) if interval.1 == edge => interval.1 = edge + advance,
                        _ => out.push((edge, edge + advance)),
                    }
                }
                edge += advance;
            }
        }
        Ok(out)
    }

    /// Whether the caret may rest at `offset`.
    ///
    /// Offsets inside a base-plus-combining-mark cluster are invalid. A
    /// segment edge with a [`BreakWeight::None`] boundary (a mid-word
    /// break) is legal but not preferred.
    pub fn is_valid_insertion_point(&self, offset: usize) -> InsertionValidity {
        let range = self.range();
        if offset < range.start || offset > range.end {
            return InsertionValidity::Invalid;
        }
        if offset > 0 && offset < self.source.len() {
            let mut buf = Vec::with_capacity(1);
            self.source.fetch(offset..offset + 1, &mut buf);
            if self.ctx.properties().is_mark(buf[0]) {
                return InsertionValidity::Invalid;
            }
        }
        if offset == range.start && self.start_weight == BreakWeight::None
            || offset == range.end && self.end_weight == BreakWeight::None
        {
            return InsertionValidity::NotPreferred;
        }
        InsertionValidity::Valid
    }

    /// The next caret position from `from` in visual order, for arrow key
    /// movement. `forward` moves toward the visual end of the segment, so
    /// inside a right-to-left run the logical offset decreases.
    ///
    /// An offset on a direction boundary exists at two visual positions;
    /// the affinity of `from` picks which one movement resumes from, and
    /// the returned [`HitPoint`] carries the affinity of the caret landed
    /// on. Positions that are not [`InsertionValidity::Valid`] are skipped.
    pub fn arrow_key_position(&self, from: HitPoint, forward: bool) -> Option<HitPoint> {
        self.step_caret(from, forward, |v| v == InsertionValidity::Valid)
    }

    /// Like [`Segment::arrow_key_position`], but for extending a selection:
    /// only [`InsertionValidity::Invalid`] positions are skipped, so a
    /// selection may end at a mid-word segment edge.
    pub fn extend_selection_position(&self, from: HitPoint, forward: bool) -> Option<HitPoint> {
        self.step_caret(from, forward, |v| v != InsertionValidity::Invalid)
    }

    fn step_caret(
        &self,
        from: HitPoint,
        forward: bool,
        accept: impl Fn(InsertionValidity) -> bool,
    ) -> Option<HitPoint> {
        let carets = self.visual_carets();
        // Exact match honors the affinity at duplicated boundary offsets;
        // interior offsets exist once, so a bare offset still resolves.
        let mut pos = carets
            .iter()
            .position(|&c| c == from)
            .or_else(|| carets.iter().position(|c| c.offset == from.offset))?;
        loop {
            pos = if forward {
                pos.checked_add(1).filter(|&p| p < carets.len())?
            } else {
                pos.checked_sub(1)?
            };
            let candidate = carets[pos];
            if accept(self.is_valid_insertion_point(candidate.offset)) {
                return Some(candidate);
            }
        }
    }

    /// All caret positions of the segment in visual order, including both
    /// edges. An offset on a direction boundary appears twice with opposite
    /// affinity: a caret associates with the previous character exactly
    /// when that character belongs to the caret's own run.
    fn visual_carets(&self) -> Vec<HitPoint> {
        let range = self.range();
        if range.is_empty() {
            return vec![HitPoint {
                offset: self.start,
                associate_previous: false,
            }];
        }
        // Direction runs only: a style change is not a direction boundary.
        let mut runs: SmallVec<[(Range<usize>, u8); 4]> = SmallVec::new();
        for (run, _, level) in style_runs(self.source, range) {
            match runs.last_mut() {
                Some((prev, prev_level)) if *prev_level == level && prev.end == run.start => {
                    prev.end = run.end;
                }
                _ => runs.push((run, level)),
            }
        }
        let levels: Vec<u8> = runs.iter().map(|&(_, level)| level).collect();
        let mut carets: Vec<HitPoint> = Vec::new();
        for ri in visual_index_order(&levels) {
            let (run, level) = &runs[ri];
            let caret = |offset: usize| HitPoint {
                offset,
                associate_previous: offset != run.start,
            };
            if level & 1 != 0 {
                carets.extend((run.start..=run.end).rev().map(caret));
            } else {
                carets.extend((run.start..=run.end).map(caret));
            }
        }
        // Same-direction run boundaries share one visual position; only the
        // opposite-direction duplicates (non-adjacent in this list) stay.
        carets.dedup_by(|a, b| a.offset == b.offset);
        carets
    }

    fn ensure_measured(&mut self, graphics: &dyn GraphicsDevice) -> Result<(), MeasureError> {
        if !self.is_measured() {
            let measured = self.compute(graphics)?;
            self.state = MeasureState::Measured(Box::new(measured));
        }
        Ok(())
    }

    fn measured(&self) -> &Measured {
        match &self.state {
            MeasureState::Measured(m) => m,
            _ => unreachable!("queried before ensure_measured"),
        }
    }

    fn compute(&self, graphics: &dyn GraphicsDevice) -> Result<Measured, MeasureError> {
        let range = self.range();
        let mut chars = Vec::with_capacity(self.len);
        self.source.fetch(range.clone(), &mut chars);

        let mut runs = Vec::new();
        let mut full_width = 0.0f32;
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        let mut leading = 0.0f32;
        for (run, style, level) in style_runs(self.source, range.clone()) {
            let metrics: RunMetrics = graphics.metrics(&style)?;
            let mut advances = Vec::with_capacity(run.len());
            let run_chars = &chars[run.start - range.start..run.end - range.start];
            graphics.advances(&style, run_chars, &mut advances)?;
            full_width += advances.iter().sum::<f32>();
            ascent = ascent.max(metrics.ascent);
            descent = descent.max(metrics.descent);
            leading = leading.max(metrics.leading);
            runs.push(RunGeometry {
                range: run,
                bidi_level: level,
                advances,
            });
        }

        // Trailing whitespace stays in the range but not in the visible
        // width.
        let props = self.ctx.properties();
        let mut trailing = 0.0f32;
        'outer: for run in runs.iter().rev() {
            for (k, &ch) in chars[run.range.start - range.start..run.range.end - range.start]
                .iter()
                .enumerate()
                .rev()
            {
                if props.line_break_class(ch).is_whitespace() {
                    trailing += run.advances[k];
                } else {
                    break 'outer;
                }
            }
        }

        Ok(Measured {
            width: full_width - trailing,
            full_width,
            ascent,
            descent,
            leading,
            runs,
        })
    }
}

impl<S: TextSource + ?Sized, P: CharacterProperties> fmt::Debug for Segment<'_, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("range", &self.range())
            .field("start_weight", &self.start_weight)
            .field("end_weight", &self.end_weight)
            .field("reason", &self.reason)
            .field("ends_line", &self.ends_line)
            .field("bidi_level", &self.bidi_level)
            .field("stretch", &self.stretch)
            .field("measured", &self.is_measured())
            .finish()
    }
}

fn hit(li: usize, rtl: bool, leading_half: bool) -> HitPoint {
    match (rtl, leading_half) {
        (false, true) => HitPoint {
            offset: li,
            associate_previous: false,
        },
        (false, false) => HitPoint {
            offset: li + 1,
            associate_previous: true,
        },
        (true, true) => HitPoint {
            offset: li + 1,
            associate_previous: true,
        },
        (true, false) => HitPoint {
            offset: li,
            associate_previous: false,
        },
    }
}

fn visual_order(runs: &[RunGeometry]) -> Vec<usize> {
    let levels: Vec<u8> = runs.iter().map(|run| run.bidi_level).collect();
    visual_index_order(&levels)
}

/// Orders run indices visually according to their bidi levels: for each
/// level from the highest down to the lowest odd one, every maximal
/// sequence of runs at or above that level is reversed.
fn visual_index_order(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    let Some(&max_level) = levels.iter().max() else {
        return order;
    };
    let lowest_odd = levels
        .iter()
        .copied()
        .filter(|level| level & 1 != 0)
        .min()
        .unwrap_or(u8::MAX);
    if lowest_odd > max_level {
        return order;
    }
    for level in (lowest_odd..=max_level).rev() {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]] >= level {
                let mut end = i + 1;
                while end < order.len() && levels[order[end]] >= level {
                    end += 1;
                }
                order[i..end].reverse();
                i = end;
            }
            i += 1;
        }
    }
    order
}
