//! Vote Entity
//!
//! One ledger row per (item, voter) pair. A revote overwrites the row's type
//! and timestamp instead of inserting a second row.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::item::Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    #[default]
    Like,
    Dislike,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Like => "like",
            VoteType::Dislike => "dislike",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "dislike" => VoteType::Dislike,
            _ => VoteType::Like,
        }
    }
}

/// A single ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub item_id: String,
    /// Self-asserted pseudonymous identifier, never authenticated
    pub voter_id: String,
    pub vote_type: VoteType,
    /// Unix millis, refreshed on revote
    pub created_at: i64,
}

impl Vote {
    pub fn new(item_id: String, voter_id: String, vote_type: VoteType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id,
            voter_id,
            vote_type,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Aggregate vote counts for one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub likes: i64,
    pub dislikes: i64,
    pub total_votes: i64,
    /// Unix millis of the most recent vote, absent when the item has none
    pub last_vote_at: Option<i64>,
}

impl VoteStats {
    pub fn empty() -> Self {
        Self {
            likes: 0,
            dislikes: 0,
            total_votes: 0,
            last_vote_at: None,
        }
    }
}

/// An item joined with its vote aggregate, as returned by the ranking query
#[derive(Debug, Clone, Serialize)]
pub struct RankedItem {
    #[serde(flatten)]
    pub item: Item,
    pub like_count: i64,
    pub dislike_count: i64,
    pub total_votes: i64,
    pub last_vote_at: Option<i64>,
}

/// A vote joined with its item's content, for the activity feed
#[derive(Debug, Clone, Serialize)]
pub struct VoteActivity {
    #[serde(flatten)]
    pub vote: Vote,
    pub content: Map<String, Value>,
}
