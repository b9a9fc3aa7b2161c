pub mod active;
pub mod path;
pub mod registry;
pub mod session;
pub mod sort;
pub mod tree;
pub mod watcher;
