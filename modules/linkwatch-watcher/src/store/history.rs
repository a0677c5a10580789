//! Append-only run history, one JSON document per calendar day.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

use linkwatch_common::{DayFile, KeywordResults, RunRecord};

pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Append one run to the day file for `run_at`'s date, creating the
    /// directory and the file as needed. Returns the path written.
    pub fn append(
        &self,
        run_at: DateTime<Utc>,
        results: &[KeywordResults],
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create history dir {}", self.dir.display()))?;

        let date = run_at.format("%Y-%m-%d").to_string();
        let path = self.dir.join(format!("{date}.json"));

        let mut day = load_day(&path, &date)?;
        day.runs.push(RunRecord {
            run_at,
            results: results.to_vec(),
        });

        let raw = serde_json::to_string_pretty(&day).context("Cannot serialize day file")?;
        fs::write(&path, raw)
            .with_context(|| format!("Cannot write history file {}", path.display()))?;
        Ok(path)
    }
}

fn load_day(path: &Path, date: &str) -> Result<DayFile> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(DayFile::new(date.to_string()));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Cannot read history file {}", path.display()));
        }
    };
    match serde_json::from_str(&raw) {
        Ok(day) => Ok(day),
        Err(e) => {
            // Corruption must never block new runs from being recorded.
            warn!(path = %path.display(), error = %e, "Unparseable day file, starting fresh");
            Ok(DayFile::new(date.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkwatch_common::SearchHit;

    fn results(keyword: &str, urls: &[&str]) -> Vec<KeywordResults> {
        vec![KeywordResults {
            keyword: keyword.to_string(),
            results: urls
                .iter()
                .map(|u| SearchHit {
                    url: u.to_string(),
                    title: format!("title for {u}"),
                    snippet: String::new(),
                    display_link: String::new(),
                })
                .collect(),
        }]
    }

    fn run_at(h: u32) -> DateTime<Utc> {
        chrono::NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn runs_within_a_day_append_to_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history"));

        let first = store.append(run_at(8), &results("x", &["https://a"])).unwrap();
        let second = store.append(run_at(12), &results("x", &["https://b"])).unwrap();
        assert_eq!(first, second);

        let day: DayFile =
            serde_json::from_str(&fs::read_to_string(&first).unwrap()).unwrap();
        assert_eq!(day.date, "2026-03-14");
        assert_eq!(day.runs.len(), 2);
        assert_eq!(day.runs[0].results[0].results[0].url, "https://a");
        assert_eq!(day.runs[1].results[0].results[0].url, "https://b");
    }

    #[test]
    fn new_day_creates_a_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history"));

        store.append(run_at(8), &results("x", &["https://a"])).unwrap();
        let next_day = chrono::NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        store.append(next_day, &results("x", &["https://b"])).unwrap();

        assert!(dir.path().join("history/2026-03-14.json").exists());
        assert!(dir.path().join("history/2026-03-15.json").exists());
    }

    #[test]
    fn corrupt_day_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let history_dir = dir.path().join("history");
        fs::create_dir_all(&history_dir).unwrap();
        fs::write(history_dir.join("2026-03-14.json"), "{not json").unwrap();

        let store = HistoryStore::new(&history_dir);
        let path = store.append(run_at(8), &results("x", &["https://a"])).unwrap();

        let day: DayFile = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(day.runs.len(), 1);
    }
}
