//! Report artifacts: JSON, markdown, the batch comparison table, and the
//! console summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};
use url::Url;

use crate::analysis::count_frequencies;
use crate::chart;
use crate::models::{AnalysisResult, TimeWindow};

static INVALID_FILENAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]+").unwrap());

/// Collapse a username into something safe to use in a filename.
#[must_use]
pub fn safe_filename(name: &str) -> String {
    let cleaned = INVALID_FILENAME.replace_all(name.trim(), "_");
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned.into_owned()
    }
}

/// Day-level window tag appended to artifact filenames.
#[must_use]
pub fn window_suffix(window: &TimeWindow) -> String {
    let fmt = |ts: DateTime<Utc>| ts.format("%Y%m%d").to_string();
    match (window.since, window.until) {
        (Some(since), Some(until)) => format!("_{}_to_{}", fmt(since), fmt(until)),
        (Some(since), None) => format!("_{}_to_", fmt(since)),
        (None, Some(until)) => format!("__to_{}", fmt(until)),
        (None, None) => String::new(),
    }
}

/// Where one analysis run's artifacts landed.
#[derive(Debug)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub chart: Option<PathBuf>,
}

/// Write the JSON, markdown, and (best-effort) chart artifacts for one
/// result.
///
/// # Errors
///
/// Returns an error if the output directory cannot be created or the JSON or
/// markdown files cannot be written. Chart failures are logged and absorbed.
pub fn save_results(
    output_dir: &Path,
    base_url: &Url,
    result: &AnalysisResult,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let window = TimeWindow {
        since: result.since,
        until: result.until,
    };
    let stem = safe_filename(&result.username);
    let suffix = window_suffix(&window);

    // Chart first so the markdown can embed it; a chart failure must not
    // cost the JSON and markdown artifacts.
    let chart_path = output_dir.join(format!("{stem}_top10{suffix}.svg"));
    let chart = match chart::render_top10(&chart_path, result) {
        Ok(true) => Some(chart_path),
        Ok(false) => None,
        Err(e) => {
            warn!("Chart rendering failed: {e:#}");
            None
        }
    };

    let json = output_dir.join(format!("{stem}_emoji_stats{suffix}.json"));
    let payload =
        serde_json::to_string_pretty(result).context("Failed to serialize analysis result")?;
    std::fs::write(&json, payload)
        .with_context(|| format!("Failed to write {}", json.display()))?;

    let markdown = output_dir.join(format!("{stem}_emoji_report{suffix}.md"));
    std::fs::write(&markdown, render_markdown(result, base_url, chart.as_deref()))
        .with_context(|| format!("Failed to write {}", markdown.display()))?;

    info!(
        json = %json.display(),
        markdown = %markdown.display(),
        chart = chart.is_some(),
        "Reports written"
    );

    Ok(ReportPaths {
        json,
        markdown,
        chart,
    })
}

fn render_markdown(result: &AnalysisResult, base_url: &Url, chart: Option<&Path>) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Emoji Usage Report for @{}\n", result.username);

    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(md, "- **Total replies**: {}", result.total_replies);
    let _ = writeln!(md, "- **Replies with emoji**: {}", result.replies_with_emoji);
    let _ = writeln!(md, "- **Emoji usage rate**: {:.2}%", result.emoji_usage_rate);
    let _ = writeln!(md, "- **Total emoji occurrences**: {}", result.total_emojis);
    let _ = writeln!(md, "- **Distinct emojis**: {}\n", result.unique_emojis);

    if result.since.is_some() || result.until.is_some() {
        let fmt = |ts: Option<DateTime<Utc>>| {
            ts.map_or_else(|| "-".to_string(), |ts| ts.to_rfc3339())
        };
        let _ = writeln!(md, "### Time Window\n");
        let _ = writeln!(md, "- since: {}", fmt(result.since));
        let _ = writeln!(md, "- until: {}\n", fmt(result.until));
    }

    let _ = writeln!(md, "## Top 10 Emojis\n");
    let _ = writeln!(md, "| Rank | Emoji | Count | Share |");
    let _ = writeln!(md, "|------|-------|-------|-------|");
    for (rank, (emoji, count)) in result.top_10_emojis.iter().enumerate() {
        let _ = writeln!(
            md,
            "| {} | {} | {} | {:.2}% |",
            rank + 1,
            emoji,
            count,
            share(*count, result.total_emojis)
        );
    }

    if let Some(chart) = chart {
        let _ = writeln!(
            md,
            "\n![Top 10 Emojis]({})",
            chart.display().to_string().replace('\\', "/")
        );
    }

    let _ = writeln!(md, "\n## Full Emoji Frequency\n");
    let _ = writeln!(md, "| Emoji | Count | Share |");
    let _ = writeln!(md, "|-------|-------|-------|");
    for (emoji, count) in &result.emoji_frequency {
        let _ = writeln!(
            md,
            "| {} | {} | {:.2}% |",
            emoji,
            count,
            share(*count, result.total_emojis)
        );
    }

    let _ = writeln!(md, "\n## By Topic\n");
    for bucket in &result.emoji_by_topic {
        if bucket.emojis.is_empty() {
            continue;
        }
        let topic_url = base_url
            .join(&format!("t/topic/{}", bucket.topic_id))
            .map_or_else(|_| format!("t/topic/{}", bucket.topic_id), Into::into);
        let _ = writeln!(md, "### [{}]({})\n", bucket.title, topic_url);

        let topic_counts = count_frequencies(&bucket.emojis);
        let _ = writeln!(md, "- Total emojis: {}", bucket.emojis.len());
        let _ = writeln!(md, "- Distinct emojis: {}", topic_counts.len());
        // Shares here are relative to this topic's own total, not the global one.
        let top_5 = topic_counts
            .iter()
            .take(5)
            .map(|(emoji, count)| {
                format!("{} ({}, {:.1}%)", emoji, count, share(*count, bucket.emojis.len()))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(md, "- Top 5: {top_5}\n");
    }

    md
}

/// Cross-user comparison table for batch runs.
///
/// # Errors
///
/// Returns an error if the report file cannot be written.
pub fn save_comparison(output_dir: &Path, results: &[AnalysisResult]) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let mut md = String::new();
    let _ = writeln!(md, "# Emoji Usage Comparison\n");

    let _ = writeln!(md, "## Overview\n");
    let _ = writeln!(
        md,
        "| User | Replies | With emoji | Usage rate | Total emojis | Distinct |"
    );
    let _ = writeln!(
        md,
        "|------|---------|------------|------------|--------------|----------|"
    );
    for result in results {
        let _ = writeln!(
            md,
            "| @{} | {} | {} | {:.2}% | {} | {} |",
            result.username,
            result.total_replies,
            result.replies_with_emoji,
            result.emoji_usage_rate,
            result.total_emojis,
            result.unique_emojis
        );
    }

    let _ = writeln!(md, "\n## Top 5 per User\n");
    for result in results {
        let _ = writeln!(md, "### @{}\n", result.username);
        for (rank, (emoji, count)) in result.top_10_emojis.iter().take(5).enumerate() {
            let _ = writeln!(md, "{}. {emoji} ({count})", rank + 1);
        }
        let _ = writeln!(md);
    }

    let path = output_dir.join("comparison_report.md");
    std::fs::write(&path, md).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Comparison report written");
    Ok(path)
}

/// Console summary mirroring the report's headline figures.
pub fn print_summary(result: &AnalysisResult) {
    println!("\n{}", "=".repeat(60));
    println!("Emoji usage for @{}", result.username);
    println!("{}", "=".repeat(60));
    println!("Total replies:      {}", result.total_replies);
    println!("Replies with emoji: {}", result.replies_with_emoji);
    println!("Emoji usage rate:   {:.2}%", result.emoji_usage_rate);
    println!("Total emojis:       {}", result.total_emojis);
    println!("Distinct emojis:    {}", result.unique_emojis);

    if !result.top_10_emojis.is_empty() {
        println!("{}", "-".repeat(60));
        println!("Top 10 emojis:");
        for (rank, (emoji, count)) in result.top_10_emojis.iter().enumerate() {
            println!(
                "{:2}. {:<24} {:>5}  ({:5.2}%)",
                rank + 1,
                emoji,
                count,
                share(*count, result.total_emojis)
            );
        }
    }
    println!("{}\n", "=".repeat(60));
}

fn share(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
