//! Test case entities.

pub mod model;

pub use model::TestCase;
