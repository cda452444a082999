//! PostgreSQL repository implementations.

pub mod folder;
pub mod testcase;

pub use folder::PgFolderRepository;
pub use testcase::PgTestCaseRepository;
