//! # scantrack-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! programs against, their sqlx-backed repositories, and an in-memory
//! implementation with the same semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{ComponentStore, ProjectStore, ScanStore};
