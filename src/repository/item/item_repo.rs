//! Item Repository Implementation
//!
//! SQLite-backed item access. New items are appended after the list's current
//! maximum position; positions are monotonic per list and not renumbered on
//! delete.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Item};

pub struct ItemRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl ItemRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert an item. A zero position means "append": the item gets
    /// `1 + MAX(position)` within its list, computed in the same transaction.
    pub async fn create(&self, entity: &Item) -> DomainResult<Item> {
        let content = serde_json::to_string(&entity.content)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let list_exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?1)",
                params![entity.list_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !list_exists {
            return Err(DomainError::NotFound(format!(
                "List {} not found",
                entity.list_id
            )));
        }

        let position = if entity.position == 0 {
            tx.query_row(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM items WHERE list_id = ?1",
                params![entity.list_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?
        } else {
            entity.position
        };

        tx.execute(
            "INSERT INTO items (id, list_id, content, likes_count, position, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
            params![
                entity.id,
                entity.list_id,
                content,
                position,
                entity.created_at,
                entity.updated_at
            ],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        tx.commit()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut item = entity.clone();
        item.position = position;
        item.likes_count = 0;
        Ok(item)
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<Item>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, list_id, content, likes_count, position, created_at, updated_at
             FROM items WHERE id = ?1",
            params![id],
            row_to_item,
        )
        .optional()
        .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// Items of one list in display order
    pub async fn find_by_list(&self, list_id: &str) -> DomainResult<Vec<Item>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT id, list_id, content, likes_count, position, created_at, updated_at
                 FROM items
                 WHERE list_id = ?1
                 ORDER BY position ASC, created_at ASC",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![list_id], row_to_item)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(items)
    }

    /// Delete an item; its votes cascade. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> DomainResult<bool> {
        let conn = self.conn.lock().await;

        let changed = conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(changed > 0)
    }
}

/// Convert a database row to Item
pub(crate) fn row_to_item(row: &Row<'_>) -> rusqlite::Result<Item> {
    let raw_content: String = row.get(2)?;
    let content = serde_json::from_str(&raw_content).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Item {
        id: row.get(0)?,
        list_id: row.get(1)?,
        content,
        likes_count: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
