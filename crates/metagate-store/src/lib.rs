pub mod memory;

pub use memory::{MemoryActivationStore, MemoryAuthStore, MemoryEntityStore};
