//! Shared type helpers used across the TestHub workspace.

pub mod patch;

pub use patch::double_option;
