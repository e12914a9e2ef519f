// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic fakes shared by the engine tests.

use crate::{
    EngineContext, GraphicsDevice, MeasureError, RunMetrics, RunStyle, StyledText,
};

/// Advance of a plain letter at the default 12pt size.
pub(crate) const LETTER: f32 = 8.0;
/// Advance of a space at the default 12pt size.
pub(crate) const SPACE: f32 = 4.0;

/// A graphics device with fixed per-character advances: letters are
/// [`LETTER`] wide, spaces [`SPACE`], combining marks and control
/// characters zero. Everything scales linearly with the font size so
/// multi-style tests stay easy to predict.
pub(crate) struct FixedMetrics;

impl FixedMetrics {
    fn advance(style: &RunStyle, ch: char) -> f32 {
        let base = match ch {
            ' ' => SPACE,
            '\n' | '\r' | '\u{200B}'..='\u{200D}' => 0.0,
            '\u{0300}'..='\u{036F}' => 0.0,
            _ => LETTER,
        };
        base * style.font_size / 12.0
    }
}

impl GraphicsDevice for FixedMetrics {
    fn advances(
        &self,
        style: &RunStyle,
        chars: &[char],
        out: &mut Vec<f32>,
    ) -> Result<(), MeasureError> {
        out.extend(chars.iter().map(|&ch| Self::advance(style, ch)));
        Ok(())
    }

    fn metrics(&self, style: &RunStyle) -> Result<RunMetrics, MeasureError> {
        Ok(RunMetrics {
            ascent: style.font_size * 0.8,
            descent: style.font_size * 0.2,
            leading: 0.0,
        })
    }
}

/// A device that refuses every request, for failure-propagation tests.
pub(crate) struct FailingDevice;

impl GraphicsDevice for FailingDevice {
    fn advances(
        &self,
        style: &RunStyle,
        _chars: &[char],
        _out: &mut Vec<f32>,
    ) -> Result<(), MeasureError> {
        Err(MeasureError::font(style.font))
    }

    fn metrics(&self, style: &RunStyle) -> Result<RunMetrics, MeasureError> {
        Err(MeasureError::font(style.font))
    }
}

pub(crate) fn ctx() -> EngineContext {
    EngineContext::new()
}

pub(crate) fn plain(text: &str) -> StyledText {
    StyledText::plain(text, RunStyle::default())
}

pub(crate) fn assert_near(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {expected}, got {actual}"
    );
}
