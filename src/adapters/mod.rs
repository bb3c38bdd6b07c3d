//! Infrastructure adapters implementing the port traits.

pub mod memory;
pub mod storage;
