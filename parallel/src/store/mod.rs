mod profile;
mod storage;

pub use profile::{ProfileStore, STORAGE_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
