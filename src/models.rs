// src/models.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientStatus {
    Pending,
    Sent,
    Failed,
}

impl Default for RecipientStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One entry of the remote recipient list. Identity is the `id`; `email` is
/// the dispatch target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: RecipientStatus,
}

/// Live snapshot of the one in-process campaign. Serialized field names are
/// the wire contract the dashboard polls against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignState {
    pub is_running: bool,
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub current_email: String,
    pub errors: Vec<String>,
}

/// Persisted send counter, bucketed by local calendar day.
///
/// `today_sent` mirrors `daily_stats[today]` and is recomputed on every read
/// so a stale value from before a day rollover never leaks out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStats {
    pub total_sent: u64,
    pub today_sent: u64,
    pub last_updated: String,
    pub daily_stats: BTreeMap<String, u64>,
}

impl Default for EmailStats {
    fn default() -> Self {
        Self {
            total_sent: 0,
            today_sent: 0,
            last_updated: chrono::Local::now().to_rfc3339(),
            daily_stats: BTreeMap::new(),
        }
    }
}
