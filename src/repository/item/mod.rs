//! Item Repository Module
//!
//! Item repository functionality split into specialized sub-modules:
//! - item_repo: Append, reads and delete
//! - item_positioning: Position management (raw set, bulk reorder)

mod item_positioning;
mod item_repo;

pub use item_repo::ItemRepository;
pub(crate) use item_repo::row_to_item;

// Re-export the operation trait so it can be used by importing ItemRepository
pub use item_positioning::ItemPositioningOperations;
