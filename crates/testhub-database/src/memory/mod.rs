//! In-memory repository implementation.

pub mod store;

pub use store::MemoryStore;
