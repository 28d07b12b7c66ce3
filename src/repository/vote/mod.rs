//! Vote Repository Module
//!
//! Vote ledger functionality split into specialized sub-modules:
//! - vote_repo: The ledger (cast/retract), stats and the likes counter
//! - vote_rankings: Ranking and activity queries derived from the ledger

mod vote_rankings;
mod vote_repo;

pub use vote_repo::VoteRepository;

// Re-export the operation trait so it can be used by importing VoteRepository
pub use vote_rankings::VoteRankingOperations;
