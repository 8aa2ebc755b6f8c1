//! Error types for the workbench tree.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{NodeAction, NodeId};

/// A shared error type for the workbench crates.
///
/// Persistence variants (`StorageRead`, `StorageWrite`, `MalformedDocument`)
/// never leave `TreeState`; they are logged there and swallowed.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WorkbenchError {
    /// A persisted or requested type tag has no registered factory.
    #[error("Unknown node type: '{type_tag}'")]
    UnknownType { type_tag: String },

    /// A type tag was registered twice.
    #[error("Node type already registered: '{type_tag}'")]
    DuplicateType { type_tag: String },

    /// No node with this id exists in the forest.
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// A node with this id is already part of the forest.
    #[error("Node already present in tree: {id}")]
    DuplicateNode { id: NodeId },

    /// Reparenting would make a node its own ancestor.
    #[error("Moving {node} under {parent} would create a cycle")]
    Cycle { node: NodeId, parent: NodeId },

    /// The node would sit deeper than the forest allows.
    #[error("Node {id} would be nested deeper than {limit} levels")]
    DepthLimit { id: NodeId, limit: usize },

    /// The node's kind has no handler for the requested action.
    #[error("Action '{action}' is not supported by node type '{type_tag}'")]
    ActionNotSupported { action: NodeAction, type_tag: String },

    /// Storage could not be read.
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// Storage could not be written.
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// The stored document does not have the expected shape.
    #[error("Malformed tree document: {0}")]
    MalformedDocument(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkbenchError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn unknown_type(type_tag: impl Into<String>) -> Self {
        Self::UnknownType {
            type_tag: type_tag.into(),
        }
    }

    pub fn not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDocument(message.into())
    }

    pub fn storage_read(message: impl Into<String>) -> Self {
        Self::StorageRead(message.into())
    }

    pub fn storage_write(message: impl Into<String>) -> Self {
        Self::StorageWrite(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound { .. })
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    pub fn is_depth_limit(&self) -> bool {
        matches!(self, Self::DepthLimit { .. })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedDocument(_))
    }

    /// True for every error raised while reading, writing or decoding
    /// persisted state.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::StorageRead(_)
                | Self::StorageWrite(_)
                | Self::MalformedDocument(_)
                | Self::Io { .. }
                | Self::Serialization { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for WorkbenchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WorkbenchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WorkbenchError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WorkbenchError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, WorkbenchError>`.
pub type Result<T> = std::result::Result<T, WorkbenchError>;
