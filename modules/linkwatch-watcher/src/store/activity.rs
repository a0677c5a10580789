//! The canonical set of every URL ever discovered. This store is the dedup
//! authority.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

use linkwatch_common::{ActivityEntry, KeywordResults};

pub struct ActivityStore {
    path: PathBuf,
}

impl ActivityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load all activity entries. A missing or unparseable document is an
    /// empty store, never an error.
    pub fn load(&self) -> Vec<ActivityEntry> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unparseable activity store, treating as empty");
                Vec::new()
            }
        }
    }

    /// Record every URL in `results` not seen before. Iterates keyword order,
    /// then result order, so the first keyword to surface a URL owns its
    /// attribution. `first_seen` is set once and never updated on
    /// rediscovery. Persists the full collection and returns only the new
    /// entries.
    pub fn record_new(
        &self,
        run_at: DateTime<Utc>,
        results: &[KeywordResults],
    ) -> Result<Vec<ActivityEntry>> {
        let mut entries = self.load();
        let mut seen: HashSet<String> = entries.iter().map(|e| e.url.clone()).collect();
        let mut new_entries = Vec::new();

        for kr in results {
            for hit in &kr.results {
                if hit.url.is_empty() || !seen.insert(hit.url.clone()) {
                    continue;
                }
                let entry = ActivityEntry {
                    url: hit.url.clone(),
                    first_seen: run_at,
                    keyword: kr.keyword.clone(),
                    title: hit.title.clone(),
                };
                entries.push(entry.clone());
                new_entries.push(entry);
            }
        }

        self.persist(&entries)?;
        Ok(new_entries)
    }

    fn persist(&self, entries: &[ActivityEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(entries).context("Cannot serialize activity")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Cannot write activity store {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_common::SearchHit;

    fn hit(url: &str) -> SearchHit {
        SearchHit {
            url: url.to_string(),
            title: format!("title for {url}"),
            snippet: String::new(),
            display_link: String::new(),
        }
    }

    fn keyword_results(pairs: &[(&str, &[&str])]) -> Vec<KeywordResults> {
        pairs
            .iter()
            .map(|(keyword, urls)| KeywordResults {
                keyword: keyword.to_string(),
                results: urls.iter().map(|u| hit(u)).collect(),
            })
            .collect()
    }

    fn run_at(day: u32) -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn record_new_dedups_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActivityStore::new(dir.path().join("activity.json"));

        let first = store
            .record_new(run_at(1), &keyword_results(&[("x", &["https://a", "https://b"])]))
            .unwrap();
        assert_eq!(first.len(), 2);

        let second = store
            .record_new(run_at(2), &keyword_results(&[("x", &["https://a", "https://c"])]))
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].url, "https://c");
        assert_eq!(store.load().len(), 3);
    }

    #[test]
    fn record_new_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActivityStore::new(dir.path().join("activity.json"));
        let results = keyword_results(&[("x", &["https://a", "https://b"])]);

        store.record_new(run_at(1), &results).unwrap();
        let urls_before: Vec<String> = store.load().iter().map(|e| e.url.clone()).collect();

        let again = store.record_new(run_at(1), &results).unwrap();
        assert!(again.is_empty());
        let urls_after: Vec<String> = store.load().iter().map(|e| e.url.clone()).collect();
        assert_eq!(urls_before, urls_after);
    }

    #[test]
    fn first_seen_never_changes_on_rediscovery() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActivityStore::new(dir.path().join("activity.json"));

        store
            .record_new(run_at(1), &keyword_results(&[("x", &["https://a"])]))
            .unwrap();
        store
            .record_new(run_at(20), &keyword_results(&[("x", &["https://a"])]))
            .unwrap();

        let entries = store.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].first_seen, run_at(1));
    }

    #[test]
    fn first_keyword_encountered_wins_attribution() {
        let dir = tempfile::tempdir().unwrap();
        let store = ActivityStore::new(dir.path().join("activity.json"));

        let new_entries = store
            .record_new(
                run_at(1),
                &keyword_results(&[("alpha", &["https://shared"]), ("beta", &["https://shared"])]),
            )
            .unwrap();

        assert_eq!(new_entries.len(), 1);
        assert_eq!(new_entries[0].keyword, "alpha");
    }

    #[test]
    fn corrupt_store_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity.json");
        fs::write(&path, "][ not json").unwrap();

        let store = ActivityStore::new(&path);
        assert!(store.load().is_empty());

        // New data still saves over the corrupt document.
        let added = store
            .record_new(run_at(1), &keyword_results(&[("x", &["https://a"])]))
            .unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(store.load().len(), 1);
    }
}
