//! Best-effort bar chart of the top-10 shortcodes.

use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::models::{AnalysisResult, TimeWindow};
use crate::report::window_suffix;

/// Bar fill color.
const BAR_COLOR: RGBColor = RGBColor(76, 120, 168);

/// Render the top-10 bar chart to `path`. Returns `Ok(false)` when there is
/// nothing to draw.
///
/// # Errors
///
/// Returns an error if the backend cannot draw or write the image; callers
/// treat that as non-fatal.
pub fn render_top10(path: &Path, result: &AnalysisResult) -> Result<bool> {
    let top = &result.top_10_emojis;
    if top.is_empty() {
        return Ok(false);
    }

    let max_count = top.iter().map(|(_, count)| *count).max().unwrap_or(1);
    let title = chart_title(result);

    let root = SVGBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE).context("Failed to clear chart background")?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(140)
        .y_label_area_size(56)
        .build_cartesian_2d(0usize..top.len(), 0usize..max_count + 1)
        .context("Failed to lay out chart axes")?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(top.len())
        .x_label_formatter(&|index| {
            top.get(*index)
                .map_or_else(String::new, |(emoji, _)| emoji.clone())
        })
        .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
        .y_desc("Count")
        .draw()
        .context("Failed to draw chart mesh")?;

    chart
        .draw_series(top.iter().enumerate().map(|(index, (_, count))| {
            Rectangle::new([(index, 0), (index + 1, *count)], BAR_COLOR.filled())
        }))
        .context("Failed to draw chart bars")?;

    root.present().context("Failed to write chart image")?;
    Ok(true)
}

fn chart_title(result: &AnalysisResult) -> String {
    let window = TimeWindow {
        since: result.since,
        until: result.until,
    };
    let suffix = window_suffix(&window).replace('_', " ");
    let suffix = suffix.trim();
    if suffix.is_empty() {
        format!("Top 10 Emojis for @{}", result.username)
    } else {
        format!("Top 10 Emojis for @{} ({suffix})", result.username)
    }
}
