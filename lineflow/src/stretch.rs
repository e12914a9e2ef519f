// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Justification stretch distribution.

use crate::analysis::{CharacterProperties, LineBreakClass};

/// Stretch eligibility of one glyph position.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StretchClass {
    /// Letters do not stretch.
    Letter,
    /// Gaps adjacent to combining marks absorb a little stretch.
    Diacritic,
    /// Inter-word whitespace absorbs most of the stretch.
    Whitespace,
}

impl StretchClass {
    /// Relative share of the stretch budget for this class.
    pub fn weight(self) -> u32 {
        match self {
            Self::Letter => 0,
            Self::Diacritic => 1,
            Self::Whitespace => 8,
        }
    }
}

/// Classifies each character position for stretching.
pub fn classify<P: CharacterProperties>(props: &P, chars: &[char]) -> Vec<StretchClass> {
    chars
        .iter()
        .map(|&ch| match props.line_break_class(ch) {
            LineBreakClass::Whitespace => StretchClass::Whitespace,
            LineBreakClass::Combining => StretchClass::Diacritic,
            _ => StretchClass::Letter,
        })
        .collect()
}

/// Splits `total` across glyphs in proportion to their class weights.
///
/// The pieces always sum to exactly `total`: each glyph receives the floor
/// of its proportional share and the rounding remainder goes to the last
/// eligible glyph. When no glyph is eligible the distribution is all zeros
/// and the caller keeps the undistributed stretch.
pub fn distribute(total: i32, classes: &[StretchClass]) -> Vec<i32> {
    let total_weight: i64 = classes.iter().map(|c| i64::from(c.weight())).sum();
    if total_weight == 0 {
        return vec![0; classes.len()];
    }
    let mut out = Vec::with_capacity(classes.len());
    let mut distributed: i64 = 0;
    let mut last_eligible = None;
    for (i, class) in classes.iter().enumerate() {
        let weight = i64::from(class.weight());
        let share = i64::from(total) * weight / total_weight;
        distributed += share;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "share is bounded by total, which is i32"
        )]
        out.push(share as i32);
        if weight > 0 {
            last_eligible = Some(i);
        }
    }
    if let Some(i) = last_eligible {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "remainder is bounded by total, which is i32"
        )]
        let remainder = (i64::from(total) - distributed) as i32;
        out[i] += remainder;
    }
    out
}
