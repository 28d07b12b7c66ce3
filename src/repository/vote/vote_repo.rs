//! Vote Ledger Implementation
//!
//! At most one row exists per (item, voter) pair; casting again rewrites that
//! row. Every mutation recomputes the owning item's `likes_count` from the
//! ledger before committing, so the counter can never be observed stale.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Vote, VoteStats, VoteType};

pub struct VoteRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl VoteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Record a vote. Inserts a new ledger row for a first-time voter,
    /// otherwise rewrites the existing row's type and timestamp. Runs as one
    /// transaction together with the counter recompute.
    pub async fn cast(
        &self,
        item_id: &str,
        voter_id: &str,
        vote_type: VoteType,
    ) -> DomainResult<Vote> {
        if voter_id.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "Voter id must not be empty".to_string(),
            ));
        }

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let item_exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1)",
                params![item_id],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        if !item_exists {
            return Err(DomainError::NotFound(format!("Item {} not found", item_id)));
        }

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM votes WHERE item_id = ?1 AND voter_id = ?2",
                params![item_id, voter_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let vote = match existing {
            Some(vote_id) => {
                // Revote: rewrite the row, preserving the uniqueness invariant
                let now = Utc::now().timestamp_millis();
                tx.execute(
                    "UPDATE votes SET vote_type = ?1, created_at = ?2 WHERE id = ?3",
                    params![vote_type.as_str(), now, vote_id],
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;

                Vote {
                    id: vote_id,
                    item_id: item_id.to_string(),
                    voter_id: voter_id.to_string(),
                    vote_type,
                    created_at: now,
                }
            }
            None => {
                let vote = Vote::new(item_id.to_string(), voter_id.to_string(), vote_type);
                tx.execute(
                    "INSERT INTO votes (id, item_id, voter_id, vote_type, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        vote.id,
                        vote.item_id,
                        vote.voter_id,
                        vote.vote_type.as_str(),
                        vote.created_at
                    ],
                )
                .map_err(|e| DomainError::Internal(e.to_string()))?;

                vote
            }
        };

        refresh_likes_count(&tx, item_id)?;

        tx.commit()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(vote)
    }

    /// Remove a voter's ledger row for an item, recomputing the counter in
    /// the same transaction. Returns false when no vote existed; that is not
    /// an error.
    pub async fn retract(&self, item_id: &str, voter_id: &str) -> DomainResult<bool> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let deleted = tx
            .execute(
                "DELETE FROM votes WHERE item_id = ?1 AND voter_id = ?2",
                params![item_id, voter_id],
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if deleted > 0 {
            refresh_likes_count(&tx, item_id)?;
        }

        tx.commit()
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        Ok(deleted > 0)
    }

    /// Aggregate counts for one item. Pure read.
    pub async fn stats_for(&self, item_id: &str) -> DomainResult<VoteStats> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT vote_type, COUNT(*), MAX(created_at)
                 FROM votes
                 WHERE item_id = ?1
                 GROUP BY vote_type",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![item_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut stats = VoteStats::empty();
        for row in rows {
            let (vote_type, count, last_at) =
                row.map_err(|e| DomainError::Internal(e.to_string()))?;
            match VoteType::from_str(&vote_type) {
                VoteType::Like => stats.likes = count,
                VoteType::Dislike => stats.dislikes = count,
            }
            stats.total_votes += count;
            stats.last_vote_at = Some(stats.last_vote_at.map_or(last_at, |t| t.max(last_at)));
        }

        Ok(stats)
    }

    /// Latest votes for an item, newest first
    pub async fn find_by_item(&self, item_id: &str, limit: i64) -> DomainResult<Vec<Vote>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT id, item_id, voter_id, vote_type, created_at
                 FROM votes
                 WHERE item_id = ?1
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![item_id, limit], row_to_vote)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut votes = Vec::new();
        for row in rows {
            votes.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(votes)
    }

    /// The ledger row for one (item, voter) pair, if any
    pub async fn find_by_item_and_voter(
        &self,
        item_id: &str,
        voter_id: &str,
    ) -> DomainResult<Option<Vote>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, item_id, voter_id, vote_type, created_at
             FROM votes WHERE item_id = ?1 AND voter_id = ?2",
            params![item_id, voter_id],
            row_to_vote,
        )
        .optional()
        .map_err(|e| DomainError::Internal(e.to_string()))
    }
}

/// Recompute the item's denormalized like counter from the ledger. Must run
/// inside the transaction of whatever ledger mutation preceded it.
fn refresh_likes_count(tx: &Transaction<'_>, item_id: &str) -> DomainResult<i64> {
    let count: i64 = tx
        .query_row(
            "SELECT COUNT(*) FROM votes WHERE item_id = ?1 AND vote_type = 'like'",
            params![item_id],
            |row| row.get(0),
        )
        .map_err(|e| DomainError::Internal(e.to_string()))?;

    tx.execute(
        "UPDATE items SET likes_count = ?1 WHERE id = ?2",
        params![count, item_id],
    )
    .map_err(|e| DomainError::Internal(e.to_string()))?;

    Ok(count)
}

/// Convert a database row to Vote
pub(super) fn row_to_vote(row: &Row<'_>) -> rusqlite::Result<Vote> {
    let vote_type: String = row.get(3)?;

    Ok(Vote {
        id: row.get(0)?,
        item_id: row.get(1)?,
        voter_id: row.get(2)?,
        vote_type: VoteType::from_str(&vote_type),
        created_at: row.get(4)?,
    })
}
