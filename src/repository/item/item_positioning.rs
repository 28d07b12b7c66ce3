//! Item Positioning Operations
//!
//! Position management within a list: a raw single-item overwrite and an
//! atomic bulk reorder driven by the drag UI.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tracing::info;

use crate::domain::{DomainError, DomainResult, Item};

/// Trait for item positioning operations
#[async_trait]
pub trait ItemPositioningOperations {
    /// Overwrite one item's position. Siblings are NOT renumbered; callers
    /// that want a consistent ordering use `reorder`.
    async fn set_position(&self, item_id: &str, new_position: i64) -> DomainResult<Item>;

    /// Assign position i+1 to the id at index i, in one transaction. Ids that
    /// do not belong to `list_id` are skipped; omitted items keep their old
    /// position.
    async fn reorder(&self, list_id: &str, ordered_item_ids: &[String]) -> DomainResult<()>;
}

#[async_trait]
impl ItemPositioningOperations for super::item_repo::ItemRepository {
    async fn set_position(&self, item_id: &str, new_position: i64) -> DomainResult<Item> {
        if new_position < 1 {
            return Err(DomainError::InvalidInput(
                "Position must be a positive number".to_string(),
            ));
        }

        {
            let conn = self.conn.lock().await;

            let changed = conn
                .execute(
                    "UPDATE items SET position = ?1, updated_at = ?2 WHERE id = ?3",
                    params![new_position, Utc::now().timestamp_millis(), item_id],
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;

            if changed == 0 {
                return Err(DomainError::NotFound(format!("Item {} not found", item_id)));
            }
        }
        // Lock released above; find_by_id takes it again (the mutex is not
        // reentrant).

        self.find_by_id(item_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Item {} not found", item_id)))
    }

    async fn reorder(&self, list_id: &str, ordered_item_ids: &[String]) -> DomainResult<()> {
        info!(
            "Reordering {} items in list {}",
            ordered_item_ids.len(),
            list_id
        );

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let now = Utc::now().timestamp_millis();
        for (index, item_id) in ordered_item_ids.iter().enumerate() {
            // Scoping by list_id silently skips ids owned by another list
            tx.execute(
                "UPDATE items SET position = ?1, updated_at = ?2 WHERE id = ?3 AND list_id = ?4",
                params![index as i64 + 1, now, item_id, list_id],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(())
    }
}
