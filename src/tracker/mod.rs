// src/tracker/mod.rs
//
// Durable tally of successful sends, kept in a flat JSON file so quota usage
// survives restarts. Brevo's own usage reporting is unreliable on the free
// tier, so this local counter is the source of truth for "how much have we
// sent today".
//
// Every storage error fails open: reads fall back to the zero state and
// writes are dropped with a log line. Sending is never blocked by this file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::models::EmailStats;

pub struct EmailTracker {
    path: PathBuf,
}

fn today_key() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

impl EmailTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> EmailStats {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(stats) => stats,
                Err(e) => {
                    warn!("Unreadable stats file {}: {}", self.path.display(), e);
                    EmailStats::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => EmailStats::default(),
            Err(e) => {
                warn!("Failed to read stats file {}: {}", self.path.display(), e);
                EmailStats::default()
            }
        }
    }

    async fn save(&self, stats: &EmailStats) {
        let json = match serde_json::to_string_pretty(stats) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize email stats: {}", e);
                return;
            }
        };

        // Write-then-rename keeps the file whole if the process dies mid-write.
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = tokio::fs::write(&tmp, json).await {
            warn!("Failed to write stats file {}: {}", tmp.display(), e);
            return;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            warn!("Failed to replace stats file {}: {}", self.path.display(), e);
        }
    }

    /// Record one confirmed successful send in today's bucket.
    pub async fn record_send(&self) -> EmailStats {
        let mut stats = self.load().await;
        let today = today_key();

        let bucket = stats.daily_stats.entry(today).or_insert(0);
        *bucket += 1;
        stats.today_sent = *bucket;
        stats.total_sent += 1;
        stats.last_updated = chrono::Local::now().to_rfc3339();

        self.save(&stats).await;
        debug!(
            total = stats.total_sent,
            today = stats.today_sent,
            "Recorded sent email"
        );
        stats
    }

    /// Read the persisted counters without mutating storage. `today_sent` is
    /// recomputed from today's bucket so a day rollover reports zero.
    pub async fn read_stats(&self) -> EmailStats {
        let mut stats = self.load().await;
        stats.today_sent = stats.daily_stats.get(&today_key()).copied().unwrap_or(0);
        stats
    }

    /// Reset all counters to the zero state, keeping the file in place.
    pub async fn reset(&self) {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            self.save(&EmailStats::default()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker_in(dir: &tempfile::TempDir) -> EmailTracker {
        EmailTracker::new(dir.path().join("email-count.json"))
    }

    #[tokio::test]
    async fn record_send_increments_total_and_daily_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir);

        for _ in 0..3 {
            tracker.record_send().await;
        }

        let stats = tracker.read_stats().await;
        assert_eq!(stats.total_sent, 3);
        assert_eq!(stats.today_sent, 3);
        assert_eq!(stats.daily_stats.get(&today_key()), Some(&3));
    }

    #[tokio::test]
    async fn counters_survive_a_new_tracker_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email-count.json");

        EmailTracker::new(&path).record_send().await;
        let stats = EmailTracker::new(&path).read_stats().await;

        assert_eq!(stats.total_sent, 1);
    }

    #[tokio::test]
    async fn read_after_day_rollover_reports_zero_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email-count.json");

        // A file last touched yesterday, with a stale todaySent.
        let yesterday = (chrono::Local::now() - chrono::Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let stale = serde_json::json!({
            "totalSent": 12,
            "todaySent": 5,
            "lastUpdated": format!("{yesterday}T09:00:00+00:00"),
            "dailyStats": { yesterday.clone(): 5 }
        });
        std::fs::write(&path, serde_json::to_string_pretty(&stale).unwrap()).unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        let stats = EmailTracker::new(&path).read_stats().await;

        assert_eq!(stats.total_sent, 12);
        assert_eq!(stats.today_sent, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("email-count.json");
        std::fs::write(&path, "not json {").unwrap();

        let tracker = EmailTracker::new(&path);
        let stats = tracker.read_stats().await;
        assert_eq!(stats.total_sent, 0);

        // Recording on top of a corrupt file starts over cleanly.
        let stats = tracker.record_send().await;
        assert_eq!(stats.total_sent, 1);
        assert_eq!(stats.today_sent, 1);
    }

    #[tokio::test]
    async fn reset_zeroes_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = tracker_in(&dir);

        tracker.record_send().await;
        tracker.reset().await;

        let stats = tracker.read_stats().await;
        assert_eq!(stats.total_sent, 0);
        assert!(stats.daily_stats.is_empty());
    }
}
