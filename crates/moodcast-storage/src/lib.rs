//! Moodcast Storage crate - whole-value key-value persistence.
//!
//! Provides the `KeyValueStore` contract (read a full value, write a full
//! value), an in-memory store for tests, a WAL-mode SQLite store with
//! migrations, and a typed repository for the trigger log and prompt
//! settings.

pub mod db;
pub mod kv;
pub mod migrations;
pub mod state;

pub use db::Database;
pub use kv::{KeyValueStore, MemoryStore};
pub use state::PromptStateRepository;
