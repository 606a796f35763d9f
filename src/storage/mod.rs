pub mod memory_storage;
pub mod neighbor_expander;

pub use memory_storage::*;
pub use neighbor_expander::*;

pub use crate::core::StorageError;
