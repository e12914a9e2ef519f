// Copyright 2026 the Lineflow Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The measurement capability consumed by the engine.

use crate::source::{FontId, RunStyle};

/// Vertical metrics for text measured in one style.
#[derive(Copy, Clone, Default, PartialEq, Debug)]
pub struct RunMetrics {
    /// Typographic ascent above the baseline.
    pub ascent: f32,
    /// Typographic descent below the baseline.
    pub descent: f32,
    /// Typographic leading.
    pub leading: f32,
}

impl RunMetrics {
    /// Total line height contributed by this run.
    pub fn height(&self) -> f32 {
        self.ascent + self.descent + self.leading
    }
}

/// Synchronous glyph measurement supplied by the host.
///
/// Implementations are expected to be fast font-metric lookups. A failure is
/// fatal for the layout being measured: the engine never retries, and a
/// segment whose measurement failed should be discarded by the caller.
pub trait GraphicsDevice {
    /// Appends the advance width of each of `chars`, rendered in `style`,
    /// to `out`.
    fn advances(
        &self,
        style: &RunStyle,
        chars: &[char],
        out: &mut Vec<f32>,
    ) -> Result<(), MeasureError>;

    /// Vertical metrics for `style`.
    fn metrics(&self, style: &RunStyle) -> Result<RunMetrics, MeasureError>;
}

/// A glyph or style the graphics device could not measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureError {
    font: FontId,
    ch: Option<char>,
}

impl MeasureError {
    /// Reports a style that cannot be measured at all.
    pub fn font(font: FontId) -> Self {
        Self { font, ch: None }
    }

    /// Reports a single character that cannot be measured.
    pub fn glyph(font: FontId, ch: char) -> Self {
        Self { font, ch: Some(ch) }
    }

    /// The font involved in the failure.
    pub fn font_id(&self) -> FontId {
        self.font
    }

    /// The character that failed to measure, if the failure was
    /// per-character.
    pub fn character(&self) -> Option<char> {
        self.ch
    }
}

impl core::fmt::Display for MeasureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.ch {
            Some(ch) => write!(f, "font {} cannot measure {ch:?}", self.font.0),
            None => write!(f, "font {} cannot be measured", self.font.0),
        }
    }
}

impl core::error::Error for MeasureError {}
