//! Database Connection and Setup
//!
//! Manages the SQLite connection, pragmas and migrations.

use std::path::Path;

use rusqlite::Connection;

use crate::domain::{DomainError, DomainResult};

/// Open (or create) the database file and bring the schema up to date
pub fn open_db(db_path: &Path) -> DomainResult<Connection> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open database: {}", e)))?;

    configure(&conn)?;
    run_migrations(&conn)?;

    Ok(conn)
}

/// In-memory database, used by tests
pub fn open_in_memory() -> DomainResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| DomainError::Internal(format!("Failed to open database: {}", e)))?;

    configure(&conn)?;
    run_migrations(&conn)?;

    Ok(conn)
}

fn configure(conn: &Connection) -> DomainResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| DomainError::Internal(e.to_string()))?;
    // Cascade deletes from lists -> items -> votes rely on this
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(())
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            template_fields TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            list_id TEXT NOT NULL,
            content TEXT NOT NULL,
            likes_count INTEGER NOT NULL DEFAULT 0,
            position INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (list_id) REFERENCES lists (id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL,
            voter_id TEXT NOT NULL,
            vote_type TEXT NOT NULL DEFAULT 'like',
            created_at INTEGER NOT NULL,
            FOREIGN KEY (item_id) REFERENCES items (id) ON DELETE CASCADE,
            UNIQUE (item_id, voter_id)
        );

        CREATE INDEX IF NOT EXISTS idx_items_list_id ON items(list_id);
        CREATE INDEX IF NOT EXISTS idx_items_position ON items(list_id, position);
        CREATE INDEX IF NOT EXISTS idx_items_likes ON items(likes_count);
        CREATE INDEX IF NOT EXISTS idx_votes_item_id ON votes(item_id);
        CREATE INDEX IF NOT EXISTS idx_votes_voter_id ON votes(voter_id);",
    )
    .map_err(|e| DomainError::Internal(format!("Failed to run migrations: {}", e)))?;

    Ok(())
}
