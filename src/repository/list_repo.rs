//! List Repository
//!
//! Lists are written once at creation and read back with or without their
//! items; there is no update or delete path.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, List, ListWithItems};

use super::item::row_to_item;

pub struct ListRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ListRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub async fn create(&self, list: &List) -> DomainResult<List> {
        let template_fields = serde_json::to_string(&list.template_fields)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO lists (id, title, description, template_fields, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                list.id,
                list.title,
                list.description,
                template_fields,
                list.created_at
            ],
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(list.clone())
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<List>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, title, description, template_fields, created_at
             FROM lists WHERE id = ?1",
            params![id],
            row_to_list,
        )
        .optional()
        .map_err(|e| DomainError::Internal(e.to_string()))
    }

    /// List joined with its items in display order
    pub async fn find_with_items(&self, id: &str) -> DomainResult<Option<ListWithItems>> {
        let conn = self.conn.lock().await;

        let list = conn
            .query_row(
                "SELECT id, title, description, template_fields, created_at
                 FROM lists WHERE id = ?1",
                params![id],
                row_to_list,
            )
            .optional()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let Some(list) = list else {
            return Ok(None);
        };

        let mut stmt = conn
            .prepare(
                "SELECT id, list_id, content, likes_count, position, created_at, updated_at
                 FROM items
                 WHERE list_id = ?1
                 ORDER BY position ASC, created_at ASC",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![id], row_to_item)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(Some(ListWithItems { list, items }))
    }

    pub async fn list_all(&self) -> DomainResult<Vec<List>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, template_fields, created_at
                 FROM lists ORDER BY created_at DESC",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_list)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut lists = Vec::new();
        for row in rows {
            lists.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(lists)
    }
}

/// Convert a database row to List
fn row_to_list(row: &Row<'_>) -> rusqlite::Result<List> {
    let raw_fields: String = row.get(3)?;
    let template_fields = serde_json::from_str(&raw_fields).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(List {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        template_fields,
        created_at: row.get(4)?,
    })
}
