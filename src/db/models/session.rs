//! Brewing history data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved brewing session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    /// `None` once the tea has been removed from the stash.
    pub tea_id: Option<String>,
    pub brewed_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub steeps: u32,
    pub grams: u32,
    pub volume_ml: u32,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

/// Session joined with the tea it was brewed from, for the history list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEntry {
    #[serde(flatten)]
    pub session: SessionRecord,
    pub tea_name: Option<String>,
    pub tea_type: Option<String>,
}
