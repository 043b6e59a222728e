//! The aggregation pipeline: window re-check, extraction, frequency folding.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::client::ApiClient;
use crate::config::Config;
use crate::extract::extract_emojis;
use crate::fetch::fetch_user_replies;
use crate::models::{AnalysisResult, PostRecord, TimeWindow, TopicBucket};

/// Fold extracted emoji lists across all records into one aggregate.
///
/// Records are re-checked against the window here, independently of
/// page-level filtering; a record whose timestamp parses outside the bounds
/// is not counted. Records without a usable timestamp are.
#[must_use]
pub fn aggregate(username: &str, records: &[PostRecord], window: &TimeWindow) -> AnalysisResult {
    let mut total_replies = 0usize;
    let mut replies_with_emoji = 0usize;
    let mut all_emojis: Vec<String> = Vec::new();
    let mut buckets: Vec<TopicBucket> = Vec::new();
    let mut bucket_index: HashMap<u64, usize> = HashMap::new();

    for record in records {
        if !window.contains(record.created()) {
            continue;
        }
        total_replies += 1;

        let emojis = extract_emojis(record.content());
        if emojis.is_empty() {
            continue;
        }
        replies_with_emoji += 1;

        if let Some(topic_id) = record.topic_id {
            let index = *bucket_index.entry(topic_id).or_insert_with(|| {
                buckets.push(TopicBucket {
                    topic_id,
                    title: record
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Topic {topic_id}")),
                    emojis: Vec::new(),
                });
                buckets.len() - 1
            });
            buckets[index].emojis.extend(emojis.iter().cloned());
        }

        all_emojis.extend(emojis);
    }

    let emoji_frequency = count_frequencies(&all_emojis);
    let top_10_emojis = emoji_frequency.iter().take(10).cloned().collect();
    let emoji_usage_rate = if total_replies == 0 {
        0.0
    } else {
        replies_with_emoji as f64 / total_replies as f64 * 100.0
    };

    AnalysisResult {
        username: username.to_string(),
        total_replies,
        replies_with_emoji,
        emoji_usage_rate,
        total_emojis: all_emojis.len(),
        unique_emojis: emoji_frequency.len(),
        emoji_frequency,
        top_10_emojis,
        emoji_by_topic: buckets,
        since: window.since,
        until: window.until,
    }
}

/// Count occurrences per shortcode, descending; ties keep the order in which
/// the shortcodes were first encountered.
#[must_use]
pub fn count_frequencies(emojis: &[String]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for emoji in emojis {
        match index.get(emoji.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(emoji.as_str(), counts.len());
                counts.push((emoji.clone(), 1));
            }
        }
    }

    // Stable sort keeps first-encountered order within equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Run the full pipeline for one user: fetch, then aggregate.
///
/// This is the single entry point both front ends call; neither the CLI nor
/// the GUI carries any pipeline logic of its own.
pub async fn analyze_user(
    client: &ApiClient,
    config: &Config,
    username: &str,
    max_pages: Option<u32>,
    window: &TimeWindow,
) -> AnalysisResult {
    let replies = fetch_user_replies(client, config, username, max_pages, window).await;
    if replies.is_empty() {
        warn!(%username, "No replies found");
    }

    let result = aggregate(username, &replies, window);
    info!(
        username = %result.username,
        total_replies = result.total_replies,
        replies_with_emoji = result.replies_with_emoji,
        total_emojis = result.total_emojis,
        unique_emojis = result.unique_emojis,
        "Analysis complete"
    );
    result
}
