//! Tenant directory backends.

pub mod memory;

pub use memory::InMemoryDirectory;
