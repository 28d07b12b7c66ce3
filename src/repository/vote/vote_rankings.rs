//! Vote Ranking Operations
//!
//! Ranking and activity queries derived from the ledger. Zero-vote items
//! still appear in rankings (LEFT JOIN) with zero counts and no last-vote
//! time, which makes them sort last.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;

use crate::domain::{DomainError, DomainResult, Item, RankedItem, VoteActivity, VoteType};

/// Trait for ranking queries over the vote ledger
#[async_trait]
pub trait VoteRankingOperations {
    /// Items of a list ordered by like count, ties broken by the more recent
    /// last vote
    async fn top_voted(&self, list_id: &str, limit: i64) -> DomainResult<Vec<RankedItem>>;

    /// Votes on a list's items within the last `window_hours`, newest first.
    /// A sliding window recomputed against the clock on every call.
    async fn voting_activity(
        &self,
        list_id: &str,
        window_hours: i64,
    ) -> DomainResult<Vec<VoteActivity>>;
}

#[async_trait]
impl VoteRankingOperations for super::vote_repo::VoteRepository {
    async fn top_voted(&self, list_id: &str, limit: i64) -> DomainResult<Vec<RankedItem>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT
                    i.id, i.list_id, i.content, i.likes_count, i.position,
                    i.created_at, i.updated_at,
                    COALESCE(v.like_count, 0) AS like_count,
                    COALESCE(v.dislike_count, 0) AS dislike_count,
                    COALESCE(v.total_votes, 0) AS total_votes,
                    v.last_vote_at
                 FROM items i
                 LEFT JOIN (
                    SELECT
                        item_id,
                        SUM(CASE WHEN vote_type = 'like' THEN 1 ELSE 0 END) AS like_count,
                        SUM(CASE WHEN vote_type = 'dislike' THEN 1 ELSE 0 END) AS dislike_count,
                        COUNT(*) AS total_votes,
                        MAX(created_at) AS last_vote_at
                    FROM votes
                    GROUP BY item_id
                 ) v ON i.id = v.item_id
                 WHERE i.list_id = ?1
                 ORDER BY like_count DESC, last_vote_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![list_id, limit], |row| {
                let raw_content: String = row.get(2)?;
                let content = serde_json::from_str(&raw_content).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;

                Ok(RankedItem {
                    item: Item {
                        id: row.get(0)?,
                        list_id: row.get(1)?,
                        content,
                        likes_count: row.get(3)?,
                        position: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    },
                    like_count: row.get(7)?,
                    dislike_count: row.get(8)?,
                    total_votes: row.get(9)?,
                    last_vote_at: row.get(10)?,
                })
            })
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut ranked = Vec::new();
        for row in rows {
            ranked.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(ranked)
    }

    async fn voting_activity(
        &self,
        list_id: &str,
        window_hours: i64,
    ) -> DomainResult<Vec<VoteActivity>> {
        let cutoff = Utc::now().timestamp_millis() - window_hours * 60 * 60 * 1000;

        let conn = self.conn.lock().await;

        let mut stmt = conn
            .prepare(
                "SELECT v.id, v.item_id, v.voter_id, v.vote_type, v.created_at, i.content
                 FROM votes v
                 JOIN items i ON v.item_id = i.id
                 WHERE i.list_id = ?1 AND v.created_at >= ?2
                 ORDER BY v.created_at DESC",
            )
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let rows = stmt
            .query_map(params![list_id, cutoff], |row| {
                let vote_type: String = row.get(3)?;
                let raw_content: String = row.get(5)?;
                let content = serde_json::from_str(&raw_content).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        5,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;

                Ok(VoteActivity {
                    vote: crate::domain::Vote {
                        id: row.get(0)?,
                        item_id: row.get(1)?,
                        voter_id: row.get(2)?,
                        vote_type: VoteType::from_str(&vote_type),
                        created_at: row.get(4)?,
                    },
                    content,
                })
            })
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let mut activity = Vec::new();
        for row in rows {
            activity.push(row.map_err(|e| DomainError::Internal(e.to_string()))?);
        }

        Ok(activity)
    }
}
