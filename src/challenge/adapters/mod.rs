//! Adapter implementations of challenge-token ports.

pub mod memory;

pub use memory::InMemoryTokenStore;
