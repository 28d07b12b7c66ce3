//! Repository Layer
//!
//! Data access over SQLite. One shared connection, repositories per entity,
//! multi-step mutations wrapped in transactions.

mod db;
mod item;
mod list_repo;
mod vote;

#[cfg(test)]
mod tests;

pub use db::{open_db, open_in_memory};
pub use item::{ItemPositioningOperations, ItemRepository};
pub use list_repo::ListRepository;
pub use vote::{VoteRankingOperations, VoteRepository};
