//! Item Entity
//!
//! An entry in a collaborative list. `content` is a free-form mapping that
//! must satisfy the owning list's template; `likes_count` is derived from the
//! vote ledger and never written directly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// An item belonging to a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub list_id: String,
    /// Field name -> value, shaped by the owning list's template
    pub content: Map<String, Value>,
    /// Count of `like` ledger entries for this item
    pub likes_count: i64,
    /// 1-based ordinal within the list; 0 means "assign on insert"
    pub position: i64,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

impl Item {
    /// Create a new item to be appended at the end of a list
    pub fn new(list_id: String, content: Map<String, Value>) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            list_id,
            content,
            likes_count: 0,
            position: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
