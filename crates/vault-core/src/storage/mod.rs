//! Storage backends for vault records
//!
//! Records are serialised JSON values under string keys. Password fields are
//! already cipher output by the time they reach a backend, so backends store
//! values as given.
//! 1. JSON file in the user's data directory
//! 2. In-memory map (tests and throwaway sessions)

mod traits;
mod file;
mod memory;

pub use traits::RecordStore;
pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
