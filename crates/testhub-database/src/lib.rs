//! # testhub-database
//!
//! The storage boundary of the folder engine: repository traits, their
//! PostgreSQL implementations, an in-memory implementation, connection
//! management and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use traits::{FolderRepository, TestCaseRepository};
