//! Task state: the local cache, its persistence and remote sync

pub mod manager;
pub mod store;

pub use manager::{TaskManager, TaskRecord};
pub use store::{CategoryMap, TaskSnapshot, TaskStore};
