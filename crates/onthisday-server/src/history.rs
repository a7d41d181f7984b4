//! Upstream history feed and event ranking.
//!
//! The upstream publishes one JSON document per month at `{base}/{MM}.json`:
//!
//! ```json
//! { "10": { "1001": [ { "year": "1949", "title": "...", "desc": "..." } ] } }
//! ```
//!
//! A missing month or day key means "no events", not an error. Raw entries
//! are cleaned of markup, scored by [`importance_score`], sorted by score
//! (stable, highest first) and truncated.
//!
//! Sources use enum dispatch like the rest of the workspace: [`HistorySource`]
//! is either the live upstream or a fixed in-memory table.

use std::collections::BTreeMap;
use std::time::Duration;

use onthisday_types::{HistoricalEvent, MonthDay};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// Default upstream base URL.
pub const DEFAULT_UPSTREAM_URL: &str = "https://baike.baidu.com/cms/home/eventsOnHistory";

/// Errors raised while reading the upstream feed.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The HTTP request failed or timed out.
    #[error("upstream request failed: {0}")]
    Request(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// The upstream body was not the expected JSON.
    #[error("upstream body decode failed: {0}")]
    Decode(String),
}

/// One entry as published upstream. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawEvent {
    /// Year as text; may be non-numeric (e.g. `前221`).
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    /// Headline, possibly containing markup.
    #[serde(default)]
    pub title: String,
    /// Description, possibly containing markup.
    #[serde(default, deserialize_with = "string_or_number")]
    pub desc: String,
}

impl RawEvent {
    /// Build a raw entry from plain strings.
    pub fn new(year: &str, title: &str, desc: &str) -> Self {
        Self {
            year: year.to_owned(),
            title: title.to_owned(),
            desc: desc.to_owned(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

// ---------------------------------------------------------------------------
// Source dispatch
// ---------------------------------------------------------------------------

/// Where historical events come from.
#[derive(Debug, Clone)]
pub enum HistorySource {
    /// The live upstream feed over HTTP.
    Upstream(UpstreamHistory),
    /// A fixed in-memory table.
    Fixed(FixedHistory),
}

impl HistorySource {
    /// Raw entries for one month/day, unranked.
    pub async fn raw_events(&self, date: MonthDay) -> Result<Vec<RawEvent>, HistoryError> {
        match self {
            Self::Upstream(source) => source.raw_events(date).await,
            Self::Fixed(source) => Ok(source.raw_events(date)),
        }
    }

    /// Cleaned, ranked events for one month/day, at most `limit` of them.
    pub async fn events(
        &self,
        date: MonthDay,
        limit: usize,
    ) -> Result<Vec<HistoricalEvent>, HistoryError> {
        let raw = self.raw_events(date).await?;
        let events = process_events(&raw, limit);
        debug!(%date, raw = raw.len(), kept = events.len(), source = self.name(), "ranked events");
        Ok(events)
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Upstream(_) => "upstream",
            Self::Fixed(_) => "fixed",
        }
    }
}

// ---------------------------------------------------------------------------
// Upstream feed
// ---------------------------------------------------------------------------

/// The monthly JSON feed over HTTP.
#[derive(Debug, Clone)]
pub struct UpstreamHistory {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamHistory {
    /// Create a client for the feed at `base_url` with a request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HistoryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HistoryError::Request(format!("client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// URL of the document holding `month`.
    pub fn month_url(&self, month: u32) -> String {
        format!("{}/{month:02}.json", self.base_url)
    }

    async fn raw_events(&self, date: MonthDay) -> Result<Vec<RawEvent>, HistoryError> {
        let url = self.month_url(date.month());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HistoryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "upstream returned error status");
            return Err(HistoryError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))?;

        extract_day(&body, date)
    }
}

/// Pull the entries for `date` out of a month document.
pub fn extract_day(body: &serde_json::Value, date: MonthDay) -> Result<Vec<RawEvent>, HistoryError> {
    let month_key = format!("{:02}", date.month());
    let day_key = format!("{:02}{:02}", date.month(), date.day());

    match body.get(&month_key).and_then(|m| m.get(&day_key)) {
        Some(entries) => Vec::<RawEvent>::deserialize(entries)
            .map_err(|e| HistoryError::Decode(format!("{month_key}/{day_key}: {e}"))),
        None => Ok(Vec::new()),
    }
}

// ---------------------------------------------------------------------------
// Fixed table
// ---------------------------------------------------------------------------

/// In-memory events keyed by month/day.
#[derive(Debug, Clone, Default)]
pub struct FixedHistory {
    entries: BTreeMap<MonthDay, Vec<RawEvent>>,
}

impl FixedHistory {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add entries for a date, replacing any existing ones.
    #[must_use]
    pub fn with(mut self, date: MonthDay, entries: Vec<RawEvent>) -> Self {
        self.entries.insert(date, entries);
        self
    }

    fn raw_events(&self, date: MonthDay) -> Vec<RawEvent> {
        self.entries.get(&date).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Cleaning and ranking
// ---------------------------------------------------------------------------

/// Clean, score, sort and truncate raw entries.
///
/// Entries with an empty year or title are dropped. Ties keep upstream
/// order.
pub fn process_events(raw: &[RawEvent], limit: usize) -> Vec<HistoricalEvent> {
    let mut scored: Vec<(u32, HistoricalEvent)> = raw
        .iter()
        .filter(|e| !e.year.is_empty() && !e.title.is_empty())
        .map(|e| {
            let score = importance_score(&e.year, &e.title, &e.desc);
            let event = HistoricalEvent::new(parse_year(&e.year), clean_text(&e.title))
                .with_desc(clean_text(&e.desc));
            (score, event)
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, e)| e).collect()
}

/// Importance of an entry; higher is more important.
///
/// Recent history weighs most, then moderately sized titles and longer
/// descriptions. Lengths are measured on the raw text in characters.
pub fn importance_score(year: &str, title: &str, desc: &str) -> u32 {
    let year_score: u32 = if is_numeric(year) {
        match year.parse::<u32>() {
            Ok(y) if y >= 1900 => 100,
            Ok(y) if y >= 1800 => 80,
            Ok(y) if y >= 1500 => 60,
            _ => 40,
        }
    } else {
        30
    };

    let title_len = title.chars().count();
    let title_score = if (10..=50).contains(&title_len) {
        20
    } else if title_len > 50 {
        15
    } else {
        10
    };

    let desc_len = desc.chars().count();
    let desc_score = if desc_len > 100 {
        25
    } else if desc_len > 50 {
        20
    } else {
        15
    };

    year_score
        .saturating_add(title_score)
        .saturating_add(desc_score)
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_year(year: &str) -> i32 {
    if is_numeric(year) {
        year.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Strip `<...>` tags, collapse whitespace runs to one space, and trim.
pub fn clean_text(text: &str) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let (before, from_open) = rest.split_at(open);
        stripped.push_str(before);
        let after_open = from_open.get(1..).unwrap_or_default();
        match after_open.find('>') {
            Some(close) if close > 0 => {
                rest = after_open.get(close.saturating_add(1)..).unwrap_or_default();
            }
            _ => {
                stripped.push('<');
                rest = after_open;
            }
        }
    }
    stripped.push_str(rest);

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn md(month: u32, day: u32) -> MonthDay {
        MonthDay::new(month, day).unwrap()
    }

    #[test]
    fn clean_text_strips_tags_and_whitespace() {
        assert_eq!(clean_text("  <a href=\"x\">中华人民共和国</a>\n  成立 "), "中华人民共和国 成立");
        assert_eq!(clean_text("a < b and c > d"), "a d");
        assert_eq!(clean_text("1 <> 2"), "1 <> 2");
        assert_eq!(clean_text("trailing <"), "trailing <");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn year_weights() {
        assert_eq!(importance_score("1949", "", ""), 100 + 10 + 15);
        assert_eq!(importance_score("1815", "", ""), 80 + 10 + 15);
        assert_eq!(importance_score("1644", "", ""), 60 + 10 + 15);
        assert_eq!(importance_score("221", "", ""), 40 + 10 + 15);
        assert_eq!(importance_score("前221", "", ""), 30 + 10 + 15);
    }

    #[test]
    fn length_weights() {
        let ten = "一二三四五六七八九十";
        assert_eq!(importance_score("1", ten, ""), 40 + 20 + 15);
        assert_eq!(importance_score("1", &"x".repeat(51), ""), 40 + 15 + 15);
        assert_eq!(importance_score("1", "", &"y".repeat(51)), 40 + 10 + 20);
        assert_eq!(importance_score("1", "", &"y".repeat(101)), 40 + 10 + 25);
    }

    #[test]
    fn process_drops_incomplete_and_ranks() {
        let raw = vec![
            RawEvent::new("", "no year", ""),
            RawEvent::new("1066", "", "no title"),
            RawEvent::new("1066", "Battle of Hastings", ""),
            RawEvent::new("1969", "Apollo <b>11</b> lands", "Humans walk on the Moon"),
            RawEvent::new("前221", "秦统一六国", ""),
        ];
        let events = process_events(&raw, 5);
        let years: Vec<i32> = events.iter().map(|e| e.year).collect();
        assert_eq!(years, vec![1969, 1066, 0]);
        assert_eq!(events.first().map(|e| e.title.as_str()), Some("Apollo 11 lands"));
        assert_eq!(events.get(1).and_then(HistoricalEvent::description), None);
    }

    #[test]
    fn process_keeps_upstream_order_on_ties_and_truncates() {
        let raw: Vec<RawEvent> = (0..8)
            .map(|i| RawEvent::new("2000", &format!("event {i}"), ""))
            .collect();
        let events = process_events(&raw, 5);
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["event 0", "event 1", "event 2", "event 3", "event 4"]);
    }

    #[test]
    fn extract_day_reads_nested_keys() {
        let body = serde_json::json!({
            "03": {
                "0305": [ { "year": 1963, "title": "t", "desc": "d" } ],
                "0306": []
            }
        });
        let raw = extract_day(&body, md(3, 5)).unwrap();
        assert_eq!(raw, vec![RawEvent::new("1963", "t", "d")]);
        assert!(extract_day(&body, md(3, 7)).unwrap().is_empty());
        assert!(extract_day(&body, md(4, 1)).unwrap().is_empty());
    }

    #[test]
    fn extract_day_rejects_wrong_shape() {
        let body = serde_json::json!({ "03": { "0305": "oops" } });
        assert!(matches!(extract_day(&body, md(3, 5)), Err(HistoryError::Decode(_))));
    }

    #[test]
    fn month_url_is_zero_padded() {
        let source = UpstreamHistory::new("http://feed.test/", Duration::from_secs(1));
        assert_eq!(
            source.map(|s| s.month_url(7)).ok().as_deref(),
            Some("http://feed.test/07.json")
        );
    }
}
