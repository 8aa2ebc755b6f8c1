pub mod config_service;
pub mod paths;
pub mod storage;
pub mod tree_state;

pub use crate::config_service::ConfigService;
pub use crate::paths::WorkbenchPaths;
pub use crate::storage::{JsonFileStorage, MemoryStorage};
pub use crate::tree_state::TreeState;
