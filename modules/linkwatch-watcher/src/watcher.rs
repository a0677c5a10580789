//! One full search-and-notify cycle.

use anyhow::Result;
use chrono::{Timelike, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use linkwatch_common::{Config, KeywordResults};

use crate::notifier::{Notifier, TelegramNotifier};
use crate::searcher::{searcher_from_config, WebSearcher};
use crate::stats::RunStats;
use crate::store::{ActivityStore, HistoryStore, NotificationQueue};

/// The run pipeline with its collaborators injected: search backend,
/// optional notifier, and the three stores. No ambient paths below here.
pub struct Watcher {
    searcher: Box<dyn WebSearcher>,
    notifier: Option<Box<dyn Notifier>>,
    history: HistoryStore,
    activity: ActivityStore,
    queue: NotificationQueue,
}

impl Watcher {
    pub fn new(
        searcher: Box<dyn WebSearcher>,
        notifier: Option<Box<dyn Notifier>>,
        history: HistoryStore,
        activity: ActivityStore,
        queue: NotificationQueue,
    ) -> Self {
        Self {
            searcher,
            notifier,
            history,
            activity,
            queue,
        }
    }

    /// Wire a watcher from environment config. Fails before touching any
    /// store when no search backend is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let searcher = searcher_from_config(config)?;
        info!(searcher = searcher.name(), "Search backend selected");
        let notifier = TelegramNotifier::from_config(config)
            .map(|n| Box::new(n) as Box<dyn Notifier>);
        Ok(Self::new(
            searcher,
            notifier,
            HistoryStore::new(config.history_dir()),
            ActivityStore::new(config.activity_file()),
            NotificationQueue::new(config.queue_file()),
        ))
    }

    /// One run: search every keyword in order, append to history, record new
    /// activity, then reconcile and deliver notifications.
    pub async fn run(&self, keywords: &[String], results_per_keyword: usize) -> Result<RunStats> {
        let run_id = Uuid::new_v4();
        let now = Utc::now();
        let run_at = now.with_nanosecond(0).unwrap_or(now);

        info!(
            %run_id,
            keywords = keywords.len(),
            results_per_keyword,
            "Starting watch run"
        );

        let mut stats = RunStats::default();
        let mut results: Vec<KeywordResults> = Vec::with_capacity(keywords.len());

        for keyword in keywords {
            match self.searcher.search(keyword, results_per_keyword).await {
                Ok(hits) => {
                    info!(%run_id, keyword, count = hits.len(), "Keyword searched");
                    stats.keywords_searched += 1;
                    stats.results_fetched += hits.len() as u32;
                    stats.per_keyword.push((keyword.clone(), hits.len()));
                    results.push(KeywordResults {
                        keyword: keyword.clone(),
                        results: hits,
                    });
                }
                Err(e) => {
                    // One keyword failing must not abort the run. No retry
                    // until the next scheduled run.
                    warn!(%run_id, keyword, error = %e, "Search failed, recording empty result list");
                    stats.keywords_failed += 1;
                    stats.per_keyword.push((keyword.clone(), 0));
                    results.push(KeywordResults {
                        keyword: keyword.clone(),
                        results: Vec::new(),
                    });
                }
            }
        }

        let path = self.history.append(run_at, &results)?;
        info!(%run_id, path = %path.display(), "Run appended to history");

        let new_entries = self.activity.record_new(run_at, &results)?;
        stats.urls_new = new_entries.len() as u32;
        info!(%run_id, new_urls = new_entries.len(), "Activity updated");

        stats.delivery = self
            .queue
            .reconcile_and_send(&self.activity, &new_entries, self.notifier.as_deref())
            .await?;

        Ok(stats)
    }
}
