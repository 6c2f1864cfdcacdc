//! Adapters - concrete implementations of ports
//!
//! These implement the port traits for specific storage backends.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
