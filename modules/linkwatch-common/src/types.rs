use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One organic result returned by a search provider.
///
/// Produced fresh on every run; never persisted standalone, only embedded
/// in the history document for the day it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub display_link: String,
}

/// A single keyword's results within one run.
///
/// A run's full result set is `Vec<KeywordResults>` in configured keyword
/// order. That vector IS the iteration-order contract: keyword order first,
/// result order within a keyword second. Dedup attribution depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordResults {
    pub keyword: String,
    pub results: Vec<SearchHit>,
}

/// One full run across all keywords.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_at: DateTime<Utc>,
    pub results: Vec<KeywordResults>,
}

/// All runs for one calendar day. Append-only audit trail: runs are pushed
/// in chronological order and never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayFile {
    pub date: String,
    pub runs: Vec<RunRecord>,
}

impl DayFile {
    pub fn new(date: String) -> Self {
        Self {
            date,
            runs: Vec::new(),
        }
    }
}

/// A unique URL and the moment it was first discovered.
///
/// At most one entry per url across the whole store. `first_seen` and
/// `keyword` are fixed at first observation; rediscovery never updates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub url: String,
    pub first_seen: DateTime<Utc>,
    pub keyword: String,
    pub title: String,
}

/// An activity entry plus its delivery state.
///
/// `sent` flips false→true only on confirmed delivery, and true→false only
/// through an explicit resend-all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub url: String,
    pub first_seen: DateTime<Utc>,
    pub keyword: String,
    pub title: String,
    pub sent: bool,
}

impl NotificationEntry {
    pub fn from_activity(entry: &ActivityEntry, sent: bool) -> Self {
        Self {
            url: entry.url.clone(),
            first_seen: entry.first_seen,
            keyword: entry.keyword.clone(),
            title: entry.title.clone(),
            sent,
        }
    }
}
