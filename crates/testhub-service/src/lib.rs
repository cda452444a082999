//! # testhub-service
//!
//! The folder hierarchy engine of TestHub. Services take their repositories
//! as `Arc<dyn ...>` trait objects at construction time, so the same code
//! runs against PostgreSQL or the in-memory store.

pub mod context;
pub mod folder;

pub use context::RequestContext;
pub use folder::{FolderError, FolderService, TreeService};
