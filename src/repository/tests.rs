//! Repository Integration Tests
//!
//! Exercises the vote ledger, positioning and ranking queries against an
//! in-memory SQLite database.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rusqlite::params;
    use serde_json::{json, Map, Value};
    use tokio::sync::Mutex;

    use crate::domain::{DomainError, FieldSpec, FieldType, Item, List, VoteType};
    use crate::repository::{
        open_db, open_in_memory, ItemPositioningOperations, ItemRepository, ListRepository,
        VoteRankingOperations, VoteRepository,
    };

    struct Repos {
        conn: Arc<Mutex<rusqlite::Connection>>,
        lists: ListRepository,
        items: ItemRepository,
        votes: VoteRepository,
    }

    fn setup() -> Repos {
        let conn = Arc::new(Mutex::new(open_in_memory().expect("Failed to init test DB")));
        Repos {
            lists: ListRepository::new(conn.clone()),
            items: ItemRepository::new(conn.clone()),
            votes: VoteRepository::new(conn.clone()),
            conn,
        }
    }

    fn movie_template() -> Vec<FieldSpec> {
        vec![FieldSpec {
            name: "movie".to_string(),
            label: "Movie".to_string(),
            field_type: FieldType::Text,
            required: true,
        }]
    }

    fn movie_content(title: &str) -> Map<String, Value> {
        let mut content = Map::new();
        content.insert("movie".to_string(), json!(title));
        content
    }

    async fn seed_list(repos: &Repos) -> List {
        let list = List::new("Top Movies".to_string(), None, movie_template());
        repos
            .lists
            .create(&list)
            .await
            .expect("Failed to create list")
    }

    async fn seed_item(repos: &Repos, list_id: &str, title: &str) -> Item {
        let item = Item::new(list_id.to_string(), movie_content(title));
        repos
            .items
            .create(&item)
            .await
            .expect("Failed to create item")
    }

    /// Pin all vote timestamps of an item, for window and tiebreak tests
    async fn set_vote_times(repos: &Repos, item_id: &str, ts: i64) {
        let conn = repos.conn.lock().await;
        conn.execute(
            "UPDATE votes SET created_at = ?1 WHERE item_id = ?2",
            params![ts, item_id],
        )
        .expect("Failed to update vote timestamps");
    }

    async fn set_vote_time_for_voter(repos: &Repos, item_id: &str, voter_id: &str, ts: i64) {
        let conn = repos.conn.lock().await;
        conn.execute(
            "UPDATE votes SET created_at = ?1 WHERE item_id = ?2 AND voter_id = ?3",
            params![ts, item_id, voter_id],
        )
        .expect("Failed to update vote timestamp");
    }

    async fn set_item_created_at(repos: &Repos, item_id: &str, ts: i64) {
        let conn = repos.conn.lock().await;
        conn.execute(
            "UPDATE items SET created_at = ?1 WHERE id = ?2",
            params![ts, item_id],
        )
        .expect("Failed to update item timestamp");
    }

    #[tokio::test]
    async fn test_create_and_fetch_list() {
        let repos = setup();

        let created = seed_list(&repos).await;
        let found = repos
            .lists
            .find_by_id(&created.id)
            .await
            .expect("Find failed")
            .expect("List missing");

        assert_eq!(found.title, "Top Movies");
        assert_eq!(found.template_fields.len(), 1);
        assert_eq!(found.template_fields[0].name, "movie");
        assert!(found.template_fields[0].required);
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_positions() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let first = seed_item(&repos, &list.id, "Inception").await;
        let second = seed_item(&repos, &list.id, "Memento").await;

        assert_eq!(first.position, 1);
        assert_eq!(first.likes_count, 0);
        assert_eq!(second.position, 2);
    }

    #[tokio::test]
    async fn test_append_continues_after_position_gap() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let item = seed_item(&repos, &list.id, "Inception").await;
        repos
            .items
            .set_position(&item.id, 5)
            .await
            .expect("Set position failed");

        let next = seed_item(&repos, &list.id, "Memento").await;
        assert_eq!(next.position, 6);
    }

    #[tokio::test]
    async fn test_append_to_missing_list_fails() {
        let repos = setup();

        let item = Item::new("no-such-list".to_string(), movie_content("Inception"));
        let err = repos.items.create(&item).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_revote_rewrites_single_ledger_row() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos
            .votes
            .cast(&item.id, "v1", VoteType::Like)
            .await
            .expect("Cast failed");

        let stats = repos.votes.stats_for(&item.id).await.expect("Stats failed");
        assert_eq!((stats.likes, stats.dislikes, stats.total_votes), (1, 0, 1));
        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");
        assert_eq!(fetched.likes_count, 1);

        // Same voter switches to a dislike: the row is rewritten, not duplicated
        repos
            .votes
            .cast(&item.id, "v1", VoteType::Dislike)
            .await
            .expect("Cast failed");

        let stats = repos.votes.stats_for(&item.id).await.expect("Stats failed");
        assert_eq!((stats.likes, stats.dislikes, stats.total_votes), (0, 1, 1));
        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");
        assert_eq!(fetched.likes_count, 0);

        let votes = repos
            .votes
            .find_by_item(&item.id, 10)
            .await
            .expect("Find failed");
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].vote_type, VoteType::Dislike);

        let ledger_row = repos
            .votes
            .find_by_item_and_voter(&item.id, "v1")
            .await
            .expect("Find failed")
            .expect("Ledger row missing");
        assert_eq!(ledger_row.vote_type, VoteType::Dislike);
    }

    #[tokio::test]
    async fn test_likes_count_never_diverges_from_ledger() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos.votes.cast(&item.id, "v1", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "v2", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "v3", VoteType::Dislike).await.unwrap();
        repos.votes.cast(&item.id, "v2", VoteType::Dislike).await.unwrap();
        repos.votes.retract(&item.id, "v1").await.unwrap();
        repos.votes.cast(&item.id, "v3", VoteType::Like).await.unwrap();

        let stats = repos.votes.stats_for(&item.id).await.expect("Stats failed");
        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");

        assert_eq!(stats.likes, 1);
        assert_eq!(stats.dislikes, 1);
        assert_eq!(stats.total_votes, 2);
        assert_eq!(fetched.likes_count, stats.likes);
    }

    #[tokio::test]
    async fn test_retract_without_vote_is_noop() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos.votes.cast(&item.id, "v1", VoteType::Like).await.unwrap();

        let removed = repos
            .votes
            .retract(&item.id, "somebody-else")
            .await
            .expect("Retract failed");
        assert!(!removed);

        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");
        assert_eq!(fetched.likes_count, 1);
    }

    #[tokio::test]
    async fn test_retract_removes_vote_and_recomputes() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos.votes.cast(&item.id, "v1", VoteType::Like).await.unwrap();

        let removed = repos
            .votes
            .retract(&item.id, "v1")
            .await
            .expect("Retract failed");
        assert!(removed);

        let stats = repos.votes.stats_for(&item.id).await.expect("Stats failed");
        assert_eq!(stats.total_votes, 0);
        assert!(stats.last_vote_at.is_none());

        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");
        assert_eq!(fetched.likes_count, 0);
    }

    #[tokio::test]
    async fn test_cast_on_missing_item_fails() {
        let repos = setup();

        let err = repos
            .votes
            .cast("no-such-item", "v1", VoteType::Like)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cast_rejects_blank_voter() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        let err = repos
            .votes
            .cast(&item.id, "   ", VoteType::Like)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_reorder_applies_new_order() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;
        let c = seed_item(&repos, &list.id, "C").await;

        repos
            .items
            .reorder(&list.id, &[c.id.clone(), a.id.clone(), b.id.clone()])
            .await
            .expect("Reorder failed");

        let ordered = repos
            .items
            .find_by_list(&list.id)
            .await
            .expect("Find failed");
        let ids: Vec<&str> = ordered.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids, vec![c.id.as_str(), a.id.as_str(), b.id.as_str()]);
        assert_eq!(ordered[0].position, 1);
        assert_eq!(ordered[2].position, 3);
    }

    #[tokio::test]
    async fn test_reorder_ignores_foreign_and_unknown_ids() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let other = {
            let l = List::new("Other".to_string(), None, movie_template());
            repos.lists.create(&l).await.expect("Failed to create list")
        };

        let a = seed_item(&repos, &list.id, "A").await;
        let foreign = seed_item(&repos, &other.id, "Foreign").await;

        repos
            .items
            .reorder(
                &list.id,
                &[
                    "no-such-item".to_string(),
                    foreign.id.clone(),
                    a.id.clone(),
                ],
            )
            .await
            .expect("Reorder failed");

        // The foreign item keeps its own position within its own list
        let untouched = repos
            .items
            .find_by_id(&foreign.id)
            .await
            .unwrap()
            .expect("Item missing");
        assert_eq!(untouched.position, foreign.position);

        let moved = repos.items.find_by_id(&a.id).await.unwrap().expect("Item missing");
        assert_eq!(moved.position, 3);
    }

    #[tokio::test]
    async fn test_reorder_leaves_omitted_items_in_place() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;
        let c = seed_item(&repos, &list.id, "C").await;

        repos
            .items
            .reorder(&list.id, &[b.id.clone(), a.id.clone()])
            .await
            .expect("Reorder failed");

        let omitted = repos.items.find_by_id(&c.id).await.unwrap().expect("Item missing");
        assert_eq!(omitted.position, 3);
    }

    #[tokio::test]
    async fn test_set_position_does_not_renumber_siblings() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;
        let c = seed_item(&repos, &list.id, "C").await;

        // Pin creation times so the duplicate-position tiebreak is stable
        set_item_created_at(&repos, &a.id, 1_000).await;
        set_item_created_at(&repos, &b.id, 2_000).await;
        set_item_created_at(&repos, &c.id, 3_000).await;

        let moved = repos
            .items
            .set_position(&c.id, 1)
            .await
            .expect("Set position failed");
        assert_eq!(moved.position, 1);

        // A keeps position 1; the tie resolves by creation time
        let ordered = repos
            .items
            .find_by_list(&list.id)
            .await
            .expect("Find failed");
        let ids: Vec<&str> = ordered.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str(), b.id.as_str()]);
    }

    #[tokio::test]
    async fn test_set_position_missing_item_fails() {
        let repos = setup();

        let err = repos.items.set_position("no-such-item", 2).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_position_rejects_non_positive() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        let err = repos.items.set_position(&item.id, 0).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_top_voted_ranks_by_likes_then_recency() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;
        let _c = seed_item(&repos, &list.id, "C").await;

        for voter in ["a1", "a2", "a3"] {
            repos.votes.cast(&a.id, voter, VoteType::Like).await.unwrap();
        }
        for voter in ["b1", "b2", "b3"] {
            repos.votes.cast(&b.id, voter, VoteType::Like).await.unwrap();
        }

        // B's ledger activity is more recent than A's
        set_vote_times(&repos, &a.id, 1_000).await;
        set_vote_times(&repos, &b.id, 2_000).await;

        let ranked = repos
            .votes
            .top_voted(&list.id, 2)
            .await
            .expect("Ranking failed");

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.id, b.id);
        assert_eq!(ranked[1].item.id, a.id);
        assert_eq!(ranked[0].like_count, 3);
        assert_eq!(ranked[0].total_votes, 3);
        assert_eq!(ranked[0].last_vote_at, Some(2_000));
    }

    #[tokio::test]
    async fn test_top_voted_sinks_zero_vote_items() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;

        repos.votes.cast(&b.id, "v1", VoteType::Dislike).await.unwrap();

        let ranked = repos
            .votes
            .top_voted(&list.id, 10)
            .await
            .expect("Ranking failed");

        assert_eq!(ranked.len(), 2);
        // B has a vote (though not a like), so it outranks the silent item
        assert_eq!(ranked[0].item.id, b.id);
        assert_eq!(ranked[0].like_count, 0);
        assert_eq!(ranked[0].dislike_count, 1);
        assert_eq!(ranked[1].item.id, a.id);
        assert_eq!(ranked[1].total_votes, 0);
        assert!(ranked[1].last_vote_at.is_none());
    }

    #[tokio::test]
    async fn test_voting_activity_sliding_window() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos.votes.cast(&item.id, "recent", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "older", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "ancient", VoteType::Dislike).await.unwrap();

        let now = Utc::now().timestamp_millis();
        set_vote_time_for_voter(&repos, &item.id, "recent", now - 60 * 60 * 1000).await;
        set_vote_time_for_voter(&repos, &item.id, "older", now - 2 * 60 * 60 * 1000).await;
        set_vote_time_for_voter(&repos, &item.id, "ancient", now - 48 * 60 * 60 * 1000).await;

        let activity = repos
            .votes
            .voting_activity(&list.id, 24)
            .await
            .expect("Activity failed");

        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].vote.voter_id, "recent");
        assert_eq!(activity[1].vote.voter_id, "older");
        assert_eq!(activity[0].content.get("movie"), Some(&json!("Inception")));
    }

    #[tokio::test]
    async fn test_delete_item_cascades_votes() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        repos.votes.cast(&item.id, "v1", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "v2", VoteType::Dislike).await.unwrap();

        let removed = repos.items.delete(&item.id).await.expect("Delete failed");
        assert!(removed);
        assert!(repos.items.find_by_id(&item.id).await.unwrap().is_none());

        let orphans: i64 = {
            let conn = repos.conn.lock().await;
            conn.query_row(
                "SELECT COUNT(*) FROM votes WHERE item_id = ?1",
                params![item.id],
                |row| row.get(0),
            )
            .expect("Count failed")
        };
        assert_eq!(orphans, 0);

        let removed_again = repos.items.delete(&item.id).await.expect("Delete failed");
        assert!(!removed_again);
    }

    #[tokio::test]
    async fn test_anonymous_likes_accumulate() {
        let repos = setup();
        let list = seed_list(&repos).await;
        let item = seed_item(&repos, &list.id, "Inception").await;

        // The legacy like shortcut casts with a fresh pseudonymous voter each
        // time, so repeated likes keep counting
        repos.votes.cast(&item.id, "anon-1", VoteType::Like).await.unwrap();
        repos.votes.cast(&item.id, "anon-2", VoteType::Like).await.unwrap();

        let stats = repos.votes.stats_for(&item.id).await.expect("Stats failed");
        let fetched = repos
            .items
            .find_by_id(&item.id)
            .await
            .unwrap()
            .expect("Item missing");

        assert_eq!(stats.likes, 2);
        assert_eq!(fetched.likes_count, 2);
    }

    #[tokio::test]
    async fn test_stats_for_unknown_item_is_empty() {
        let repos = setup();

        let stats = repos
            .votes
            .stats_for("no-such-item")
            .await
            .expect("Stats failed");

        assert_eq!(stats.likes, 0);
        assert_eq!(stats.dislikes, 0);
        assert_eq!(stats.total_votes, 0);
        assert!(stats.last_vote_at.is_none());
    }

    #[tokio::test]
    async fn test_file_backed_database_persists() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("ranklist.db");

        let list_id = {
            let conn = Arc::new(Mutex::new(open_db(&db_path).expect("Failed to open DB")));
            let lists = ListRepository::new(conn);
            let list = List::new("Persisted".to_string(), None, movie_template());
            lists.create(&list).await.expect("Failed to create list");
            list.id
        };

        let conn = Arc::new(Mutex::new(open_db(&db_path).expect("Failed to reopen DB")));
        let lists = ListRepository::new(conn);
        let found = lists
            .find_by_id(&list_id)
            .await
            .expect("Find failed")
            .expect("List missing after reopen");

        assert_eq!(found.title, "Persisted");
    }

    #[tokio::test]
    async fn test_find_with_items_returns_display_order() {
        let repos = setup();
        let list = seed_list(&repos).await;

        let a = seed_item(&repos, &list.id, "A").await;
        let b = seed_item(&repos, &list.id, "B").await;

        repos
            .items
            .reorder(&list.id, &[b.id.clone(), a.id.clone()])
            .await
            .expect("Reorder failed");

        let with_items = repos
            .lists
            .find_with_items(&list.id)
            .await
            .expect("Find failed")
            .expect("List missing");

        assert_eq!(with_items.list.id, list.id);
        let ids: Vec<&str> = with_items.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), a.id.as_str()]);
    }
}
