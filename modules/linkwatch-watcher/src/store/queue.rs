//! Notification queue: reconciles delivery state against activity and
//! sends pending entries.
//!
//! The queue's url-set is kept a superset of the activity store's: URLs that
//! predate the queue are backfilled as already sent, this run's new URLs are
//! appended unsent. The document is written exactly once per operation,
//! after the delivery pass, so a crash mid-batch loses at most the
//! sent-flags of that pass.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use linkwatch_common::{ActivityEntry, NotificationEntry};

use super::ActivityStore;
use crate::notifier::Notifier;

/// Fixed pause between sends. Telegram flood control is per-second.
const SEND_DELAY: Duration = Duration::from_millis(200);

/// Log a progress line every this many attempts.
const PROGRESS_EVERY: usize = 10;

/// Outcome of one delivery pass.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub pending: usize,
    pub attempted: usize,
    pub sent: usize,
    pub first_error: Option<String>,
    pub credentials_missing: bool,
}

impl DeliveryReport {
    pub fn failed(&self) -> usize {
        self.attempted - self.sent
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pending == 0 {
            return write!(f, "Nothing to send: no pending entries");
        }
        if self.credentials_missing {
            return write!(
                f,
                "Delivery skipped: {} pending, Telegram credentials not set",
                self.pending
            );
        }
        write!(f, "Sent {}/{} pending notifications", self.sent, self.pending)?;
        if let Some(err) = &self.first_error {
            write!(f, " (first error: {err})")?;
        }
        Ok(())
    }
}

pub struct NotificationQueue {
    path: PathBuf,
}

impl NotificationQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the queue. Missing, empty, or unparseable documents are an empty
    /// queue; corruption never blocks a run.
    pub fn load(&self) -> Vec<NotificationEntry> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unparseable notification queue, treating as empty");
                Vec::new()
            }
        }
    }

    /// Reconcile the queue against the activity store and this run's new
    /// entries, then deliver whatever is still unsent.
    ///
    /// Backfill runs only when the loaded queue is empty and activity is not:
    /// URLs discovered before the queue existed are recorded as already sent
    /// so they never trigger a retroactive flood.
    pub async fn reconcile_and_send(
        &self,
        activity: &ActivityStore,
        new_entries: &[ActivityEntry],
        notifier: Option<&dyn Notifier>,
    ) -> Result<DeliveryReport> {
        let mut entries = self.load();
        let mut seen: HashSet<String> = entries.iter().map(|e| e.url.clone()).collect();

        if entries.is_empty() {
            // Activity was already updated with this run's discoveries;
            // backfill must skip them, they still need delivery.
            let new_urls: HashSet<&str> = new_entries.iter().map(|e| e.url.as_str()).collect();
            let mut backfilled = 0usize;
            for entry in &activity.load() {
                if entry.url.is_empty()
                    || new_urls.contains(entry.url.as_str())
                    || !seen.insert(entry.url.clone())
                {
                    continue;
                }
                entries.push(NotificationEntry::from_activity(entry, true));
                backfilled += 1;
            }
            if backfilled > 0 {
                info!(
                    count = backfilled,
                    "Backfilled queue from pre-existing activity as already sent"
                );
            }
        }

        for entry in new_entries {
            if entry.url.is_empty() || !seen.insert(entry.url.clone()) {
                continue;
            }
            entries.push(NotificationEntry::from_activity(entry, false));
        }

        let report = deliver(&mut entries, notifier).await;
        self.persist(&entries)?;
        Ok(report)
    }

    /// Deliver pending entries without reconciling. Used by the send binary.
    pub async fn send_pending(&self, notifier: Option<&dyn Notifier>) -> Result<DeliveryReport> {
        let mut entries = self.load();
        let report = deliver(&mut entries, notifier).await;
        self.persist(&entries)?;
        Ok(report)
    }

    /// Reset every entry to unsent, then deliver the whole queue again.
    /// The only path by which a sent entry becomes unsent.
    pub async fn resend_all(&self, notifier: Option<&dyn Notifier>) -> Result<DeliveryReport> {
        let mut entries = self.load();
        for entry in &mut entries {
            entry.sent = false;
        }
        info!(count = entries.len(), "Marked all entries as unsent");
        let report = deliver(&mut entries, notifier).await;
        self.persist(&entries)?;
        Ok(report)
    }

    fn persist(&self, entries: &[NotificationEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(entries).context("Cannot serialize queue")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Cannot write notification queue {}", self.path.display()))?;
        Ok(())
    }
}

/// Send every unsent entry in order, flipping `sent` in memory on success.
/// One failed send never blocks the rest of the batch; only the first error
/// message is kept, the rest are counted.
async fn deliver(
    entries: &mut [NotificationEntry],
    notifier: Option<&dyn Notifier>,
) -> DeliveryReport {
    let mut report = DeliveryReport {
        pending: entries
            .iter()
            .filter(|e| !e.sent && !e.url.is_empty())
            .count(),
        ..DeliveryReport::default()
    };

    if report.pending == 0 {
        info!("Nothing to send: queue has no pending entries");
        return report;
    }

    let Some(notifier) = notifier else {
        report.credentials_missing = true;
        warn!(
            pending = report.pending,
            "Telegram credentials not set, entries stay pending"
        );
        return report;
    };

    let total = report.pending;
    info!(pending = total, "Sending pending notifications, one per message");

    for entry in entries.iter_mut().filter(|e| !e.sent && !e.url.is_empty()) {
        report.attempted += 1;
        let text = format!("Keyword: {}\n{}", entry.keyword, entry.url);
        match notifier.send(&text).await {
            Ok(()) => {
                entry.sent = true;
                report.sent += 1;
            }
            Err(e) => {
                if report.first_error.is_none() {
                    report.first_error = Some(e.to_string());
                }
            }
        }
        if report.attempted % PROGRESS_EVERY == 0 || report.attempted == total {
            info!(
                attempted = report.attempted,
                total,
                ok = report.sent,
                "Delivery progress"
            );
        }
        tokio::time::sleep(SEND_DELAY).await;
    }

    report
}
