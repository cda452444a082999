//! Folder domain entities.

pub mod model;
pub mod tree;

pub use model::{CreateFolder, Folder, FolderPatch, FolderStatus};
pub use tree::FolderTree;
