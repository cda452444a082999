//! # testhub-core
//!
//! Core crate for TestHub. Contains configuration schemas, shared serde
//! helpers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other TestHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
