//! Domain layer of the AWS Workbench tree: nodes and their kinds, the
//! forest, the type registry and the persisted document format.

pub mod config;
pub mod error;
pub mod node;
pub mod persist;
pub mod registry;
pub mod storage;

pub use error::{Result, WorkbenchError};
pub use node::{Node, NodeId, NodeKind, NodePayload, NodeTree};
pub use registry::NodeRegistry;
pub use storage::KeyValueStorage;
