//! Storage abstraction and implementations for Optivita.
//!
//! This crate provides a trait-based storage interface for program aggregates
//! with an in-memory backend, a JSON-file backend and an optional SQLite
//! backend (`sqlite` feature).

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
#[cfg(feature = "json")]
pub mod json_storage;
#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub use trait_::{newest_before, Storage, StorageError, Result};
pub use memory::MemoryStorage;
#[cfg(feature = "json")]
pub use json_storage::JsonStorage;
#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;
