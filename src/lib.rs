pub mod config;
pub mod executor;
pub mod history;
pub mod session;
pub mod shell;
pub mod storage;
pub mod tree;

// Re-export commonly used types
pub use config::Config;
pub use history::{Entry, EntryFilter, StorageError};
pub use shell::ShellType;
pub use storage::Store;
pub use tree::{build_tree, render::render, DirectoryNode};

#[cfg(test)]
mod tests;
