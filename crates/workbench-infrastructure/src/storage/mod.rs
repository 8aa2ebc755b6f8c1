pub mod atomic_json;
pub mod json_file_storage;
pub mod memory_storage;

pub use atomic_json::AtomicJsonFile;
pub use json_file_storage::JsonFileStorage;
pub use memory_storage::MemoryStorage;
