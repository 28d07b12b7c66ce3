//! Shared application state: configuration plus the repositories, all backed
//! by one SQLite connection.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::domain::{DomainError, DomainResult};
use crate::repository::{open_db, ItemRepository, ListRepository, VoteRepository};

pub struct AppState {
    pub config: Config,
    pub list_repo: ListRepository,
    pub item_repo: ItemRepository,
    pub vote_repo: VoteRepository,
}

impl AppState {
    pub fn new(config: Config) -> DomainResult<Arc<Self>> {
        if let Some(dir) = config.database_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    DomainError::Internal(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Arc::new(Mutex::new(open_db(&config.database_path)?));

        Ok(Arc::new(Self {
            list_repo: ListRepository::new(conn.clone()),
            item_repo: ItemRepository::new(conn.clone()),
            vote_repo: VoteRepository::new(conn),
            config,
        }))
    }
}
