//! Records and aggregates for one analysis run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One reply action as returned by the forum's user actions endpoint.
///
/// Every field the pipeline touches is optional; absence semantics are
/// decided here, once, instead of at each use site. Records are immutable
/// after the fetch boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    pub created_at: Option<String>,
    pub topic_id: Option<u64>,
    pub title: Option<String>,
    /// Server-rendered HTML body.
    pub cooked: Option<String>,
    /// Plain-text excerpt, used when `cooked` is empty.
    pub excerpt: Option<String>,
}

impl PostRecord {
    /// Parsed creation timestamp; `None` when absent or unparsable.
    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Content to scan: the rendered body when non-empty, else the excerpt.
    #[must_use]
    pub fn content(&self) -> &str {
        match self.cooked.as_deref() {
            Some(cooked) if !cooked.is_empty() => cooked,
            _ => self.excerpt.as_deref().unwrap_or(""),
        }
    }
}

/// Response envelope of `user_actions.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserActionsResponse {
    #[serde(default)]
    pub user_actions: Vec<PostRecord>,
}

/// Parse the forum's ISO-8601-like timestamps: `2024-05-12T03:14:15.000Z`,
/// the whole-second form, or a zone-less variant treated as UTC. Anything
/// else means "no timestamp", never an error.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

#[derive(Debug, Error)]
#[error("invalid time bound {input:?}: expected ISO-8601 or YYYY-MM-DD")]
pub struct WindowParseError {
    pub input: String,
}

/// Inclusive `[since, until]` bounds restricting which records are counted.
/// Either side may be absent, meaning unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Parse user-supplied bounds: full ISO-8601 or a bare `YYYY-MM-DD` day.
    /// Until-days extend to the end of the day. Blank input means unbounded.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-blank bound matches neither format.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self, WindowParseError> {
        let clean = |raw: Option<&str>| raw.map(str::trim).filter(|s| !s.is_empty());
        Ok(Self {
            since: clean(since).map(|raw| parse_bound(raw, false)).transpose()?,
            until: clean(until).map(|raw| parse_bound(raw, true)).transpose()?,
        })
    }

    /// Whether a record with this timestamp is counted. Records without a
    /// usable timestamp pass conservatively.
    #[must_use]
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = timestamp else { return true };
        if self.since.is_some_and(|since| ts < since) {
            return false;
        }
        if self.until.is_some_and(|until| ts > until) {
            return false;
        }
        true
    }
}

fn parse_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, WindowParseError> {
    if let Some(ts) = parse_timestamp(raw) {
        return Ok(ts);
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| WindowParseError {
        input: raw.to_string(),
    })?;
    let time = if end_of_day {
        day.and_hms_opt(23, 59, 59)
    } else {
        day.and_hms_opt(0, 0, 0)
    }
    .expect("valid wall-clock time");
    Ok(Utc.from_utc_datetime(&time))
}

/// Emoji occurrences accumulated for one forum topic, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicBucket {
    pub topic_id: u64,
    pub title: String,
    pub emojis: Vec<String>,
}

/// Aggregate emoji statistics for one user over one analysis run.
/// Constructed once by the aggregator and immutable afterwards; serialized
/// field-for-field as the JSON artifact.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub username: String,
    pub total_replies: usize,
    pub replies_with_emoji: usize,
    /// Share of replies containing at least one emoji, in percent.
    pub emoji_usage_rate: f64,
    pub total_emojis: usize,
    pub unique_emojis: usize,
    /// Shortcode counts, descending; ties keep first-encountered order.
    pub emoji_frequency: Vec<(String, usize)>,
    pub top_10_emojis: Vec<(String, usize)>,
    pub emoji_by_topic: Vec<TopicBucket>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).expect("valid timestamp")
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let parsed = parse_timestamp("2024-05-12T03:14:15.000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 12, 3, 14, 15).unwrap());
    }

    #[test]
    fn test_parse_timestamp_whole_seconds() {
        let parsed = parse_timestamp("2024-05-12T03:14:15Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 12, 3, 14, 15).unwrap());
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-05-12"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let window = TimeWindow {
            since: Some(ts("2024-01-01T00:00:00Z")),
            until: Some(ts("2024-12-31T23:59:59Z")),
        };
        assert!(window.contains(Some(ts("2024-01-01T00:00:00Z"))));
        assert!(window.contains(Some(ts("2024-12-31T23:59:59Z"))));
        assert!(!window.contains(Some(ts("2023-12-31T23:59:59Z"))));
        assert!(!window.contains(Some(ts("2025-01-01T00:00:00Z"))));
    }

    #[test]
    fn test_window_passes_missing_timestamps() {
        let window = TimeWindow {
            since: Some(ts("2024-01-01T00:00:00Z")),
            until: None,
        };
        assert!(window.contains(None));
    }

    #[test]
    fn test_window_parse_day_bounds() {
        let window = TimeWindow::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        assert_eq!(window.since, Some(ts("2024-03-01T00:00:00Z")));
        assert_eq!(window.until, Some(ts("2024-03-31T23:59:59Z")));
    }

    #[test]
    fn test_window_parse_blank_is_unbounded() {
        let window = TimeWindow::parse(Some("  "), None).unwrap();
        assert_eq!(window, TimeWindow::default());
    }

    #[test]
    fn test_window_parse_rejects_garbage() {
        assert!(TimeWindow::parse(Some("last tuesday"), None).is_err());
    }

    #[test]
    fn test_record_content_falls_back_to_excerpt() {
        let record = PostRecord {
            created_at: None,
            topic_id: None,
            title: None,
            cooked: Some(String::new()),
            excerpt: Some("plain :smile: text".to_string()),
        };
        assert_eq!(record.content(), "plain :smile: text");

        let record = PostRecord {
            created_at: None,
            topic_id: None,
            title: None,
            cooked: Some("<p>cooked</p>".to_string()),
            excerpt: Some("excerpt".to_string()),
        };
        assert_eq!(record.content(), "<p>cooked</p>");
    }

    #[test]
    fn test_response_missing_actions_field() {
        let response: UserActionsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.user_actions.is_empty());
    }

    #[test]
    fn test_record_ignores_unknown_fields() {
        let json = r#"{
            "created_at": "2024-05-12T03:14:15.000Z",
            "topic_id": 42,
            "title": "A topic",
            "cooked": "<p>hi</p>",
            "action_type": 5,
            "acting_username": "someone"
        }"#;
        let record: PostRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.topic_id, Some(42));
        assert!(record.created().is_some());
    }
}
