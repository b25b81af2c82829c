//! Adapter implementations of the pipeline ports.

pub mod memory;
