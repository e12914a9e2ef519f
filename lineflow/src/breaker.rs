// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Width-budgeted line breaking.

use core::fmt;
use core::ops::Range;

use crate::analysis::{CharacterProperties, LineBreakClass};
use crate::context::EngineContext;
use crate::graphics::{GraphicsDevice, MeasureError};
use crate::source::{TextSource, style_runs};

/// The cause of a line break.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub enum BreakReason {
    /// The end of the range was reached without exhausting the width budget.
    #[default]
    None,
    /// A regular break at a legal break opportunity.
    Regular,
    /// A mandatory break character forced the break.
    Explicit,
    /// No legal opportunity fit the budget; the break was forced mid-word.
    /// The caller may prefer to accept overflow instead.
    Emergency,
}

/// How strongly a boundary prefers or allows a line break.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum BreakWeight {
    /// Not a natural boundary (mid-word).
    #[default]
    None,
    /// A letter-boundary opportunity (after a hyphen or similar).
    Letter,
    /// A whitespace boundary.
    Whitespace,
    /// A mandatory break.
    Mandatory,
}

/// The outcome of a break search: the first offset *not* in the segment,
/// the weight of the boundary, and why the scan stopped there.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BreakPoint {
    /// End of the segment (exclusive), in characters.
    pub offset: usize,
    /// Weight of the boundary at `offset`.
    pub weight: BreakWeight,
    /// Why the scan stopped.
    pub reason: BreakReason,
}

/// Finds segment boundaries within a width budget.
///
/// The breaker is a pure function of its inputs: repeated calls with the
/// same text, classes and budget return the same break. Scratch buffers are
/// reused across calls.
pub struct LineBreaker<'a, S: TextSource + ?Sized, P: CharacterProperties> {
    ctx: &'a EngineContext<P>,
    source: &'a S,
    chars: Vec<char>,
    classes: Vec<LineBreakClass>,
    advances: Vec<f32>,
}

impl<'a, S: TextSource + ?Sized, P: CharacterProperties> LineBreaker<'a, S, P> {
    /// Creates a breaker over one text source.
    pub fn new(ctx: &'a EngineContext<P>, source: &'a S) -> Self {
        Self {
            ctx,
            source,
            chars: Vec::new(),
            classes: Vec::new(),
            advances: Vec::new(),
        }
    }

    /// Finds where a segment starting at `range.start` should end, given at
    /// most `max_width` of space.
    ///
    /// The returned break is always valid and always makes progress: for a
    /// nonempty range the offset is strictly greater than `range.start`,
    /// even when the first character alone overflows the budget. Trailing
    /// whitespace is included in the segment but excluded from the measured
    /// width, so it never forces a break by itself.
    ///
    /// `is_line_start` suppresses break opportunities inside leading
    /// whitespace so a line never consists solely of hanging spaces.
    /// `require_final_break` asks for a boundary weight (rather than
    /// [`BreakWeight::None`]) when the scan runs off the end of the range.
    ///
    /// `range.start <= range.end <= source.len()` is a caller contract.
    pub fn find_break(
        &mut self,
        graphics: &dyn GraphicsDevice,
        range: Range<usize>,
        max_width: f32,
        require_final_break: bool,
        is_line_start: bool,
    ) -> Result<BreakPoint, MeasureError> {
        debug_assert!(range.start <= range.end, "malformed range");
        self.fill(graphics, range.clone())?;

        // Visible width so far, excluding any whitespace run still pending
        // at the scan position.
        let mut x = 0.0f32;
        let mut pending_ws = 0.0f32;
        // Last legal opportunity seen, as (offset, weight).
        let mut opportunity: Option<(usize, BreakWeight)> = None;
        let mut in_leading_ws = is_line_start;

        for i in range.clone() {
            let idx = i - range.start;
            let class = self.classes[idx];
            let advance = self.advances[idx];
            match class {
                LineBreakClass::Mandatory => {
                    // CR immediately followed by LF is one break, not two.
                    let crlf = self.chars[idx] == '\r' && self.chars.get(idx + 1) == Some(&'\n');
                    return Ok(BreakPoint {
                        offset: if crlf { i + 2 } else { i + 1 },
                        weight: BreakWeight::Mandatory,
                        reason: BreakReason::Explicit,
                    });
                }
                LineBreakClass::Whitespace => {
                    // Whitespace hangs: it never triggers overflow on its
                    // own, and its width is only committed when a following
                    // non-space character joins the line.
                    pending_ws += advance;
                    if !in_leading_ws {
                        opportunity = Some((i + 1, BreakWeight::Whitespace));
                    }
                }
                LineBreakClass::Combining => {
                    if pending_ws > 0.0 {
                        pending_ws += advance;
                    } else {
                        x += advance;
                    }
                    // A mark glued to the previous character invalidates an
                    // opportunity that would split them.
                    if let Some((offset, weight)) = opportunity {
                        if offset == i {
                            opportunity = Some((i + 1, weight));
                        }
                    }
                }
                LineBreakClass::Letter | LineBreakClass::Opportunity => {
                    let next_x = x + pending_ws + advance;
                    if next_x > max_width && i > range.start {
                        if let Some((offset, weight)) = opportunity {
                            if offset > range.start {
                                return Ok(BreakPoint {
                                    offset,
                                    weight,
                                    reason: BreakReason::Regular,
                                });
                            }
                        }
                        // Unbreakable run longer than the budget: break
                        // anywhere, before the character that overflowed.
                        return Ok(BreakPoint {
                            offset: i,
                            weight: BreakWeight::None,
                            reason: BreakReason::Emergency,
                        });
                    }
                    x = next_x;
                    pending_ws = 0.0;
                    in_leading_ws = false;
                    if class == LineBreakClass::Opportunity {
                        opportunity = Some((i + 1, BreakWeight::Letter));
                    }
                }
            }
        }

        let weight = if require_final_break {
            match self.classes.last() {
                Some(class) if class.is_whitespace() => BreakWeight::Whitespace,
                Some(_) => BreakWeight::Letter,
                None => BreakWeight::None,
            }
        } else {
            BreakWeight::None
        };
        Ok(BreakPoint {
            offset: range.end,
            weight,
            reason: BreakReason::None,
        })
    }

    /// Fetches characters, classes and advances for `range`, one style run
    /// at a time.
    fn fill(
        &mut self,
        graphics: &dyn GraphicsDevice,
        range: Range<usize>,
    ) -> Result<(), MeasureError> {
        self.chars.clear();
        self.classes.clear();
        self.advances.clear();
        self.source.fetch(range.clone(), &mut self.chars);
        let props = self.ctx.properties();
        self.classes
            .extend(self.chars.iter().map(|&ch| props.line_break_class(ch)));
        for (run, style, _) in style_runs(self.source, range.clone()) {
            let chars = &self.chars[run.start - range.start..run.end - range.start];
            graphics.advances(&style, chars, &mut self.advances)?;
        }
        debug_assert_eq!(self.advances.len(), self.chars.len());
        Ok(())
    }
}

impl<S: TextSource + ?Sized, P: CharacterProperties> fmt::Debug for LineBreaker<'_, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBreaker")
            .field("source_len", &self.source.len())
            .finish()
    }
}
