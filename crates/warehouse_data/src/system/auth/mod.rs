pub mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SessionCredentials};
