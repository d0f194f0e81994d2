//! Background LeetCode synchronization engine.

pub mod difficulty_cache;
pub mod engine;
pub mod service;

pub use engine::{SyncEngine, SyncError};
pub use service::SyncService;
