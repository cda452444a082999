//! # testhub-entity
//!
//! Domain entity models for TestHub. Every struct in this crate represents
//! a database table row or a domain value object. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod folder;
pub mod testcase;
