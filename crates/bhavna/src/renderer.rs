//! Turns an [`AnalysisResult`] into what the result panel shows.
//!
//! Everything here is pure; widgets are drawn elsewhere from the
//! [`RenderedView`] and [`ChartSeries`] produced here.

use crate::analysis::AnalysisResult;
use crate::chart::{ChartConfig, ChartSeries, SeriesPoint};

/// Shown for any emotion not in the glyph table.
pub const DEFAULT_GLYPH: &str = "🤔";

const GLYPHS: &[(&str, &str)] = &[
    ("happy", "😊"),
    ("sad", "😢"),
    ("angry", "😠"),
    ("neutral", "😐"),
    ("surprise", "😲"),
    ("fear", "😨"),
    ("disgust", "🤢"),
];

/// Display primitives for one result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub glyph: &'static str,
    pub label: String,
    /// Rounded confidence, 0..=100.
    pub percent: u64,
    /// One row per score, in the service's order.
    pub rows: Vec<ScoreRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub label: String,
    pub percent: u64,
}

/// Glyph for `emotion`, matched case-insensitively.
pub fn glyph_for(emotion: &str) -> &'static str {
    let key = emotion.to_lowercase();
    GLYPHS
        .iter()
        .find(|(name, _)| *name == key)
        .map_or(DEFAULT_GLYPH, |(_, glyph)| *glyph)
}

/// Upper-case the first character and leave the rest alone.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A `[0, 1]` fraction as a rounded percentage.
pub fn to_percent(fraction: f64) -> u64 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u64
}

pub fn render(result: &AnalysisResult) -> RenderedView {
    RenderedView {
        glyph: glyph_for(&result.emotion),
        label: capitalize(&result.emotion),
        percent: to_percent(result.confidence),
        rows: result
            .scores
            .iter()
            .map(|(label, value)| ScoreRow {
                label: capitalize(label),
                percent: to_percent(value),
            })
            .collect(),
    }
}

/// Chart bars for `view`, colored from the palette in order.
pub fn series(view: &RenderedView, config: &ChartConfig) -> ChartSeries {
    let points = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| SeriesPoint {
            label: row.label.clone(),
            percent: row.percent,
            color: config.color_at(i),
        })
        .collect();
    ChartSeries { points }
}
