//! Persisted document layout.
//!
//! ```json
//! { "version": "1.0.0",
//!   "roots": [ { "typeTag": "FolderNode", "fields": { ... }, "children": [ ... ] } ] }
//! ```

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WorkbenchError};

/// Version written into every document.
pub const DOCUMENT_VERSION: &str = "1.0.0";

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

/// The whole persisted forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub roots: Vec<NodeRecord>,
}

/// One persisted node and, recursively, its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub type_tag: String,
    pub fields: Map<String, Value>,
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    /// Number of records in this subtree, itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(NodeRecord::subtree_len).sum::<usize>()
    }
}

impl Default for TreeDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            roots: Vec::new(),
        }
    }
}

impl TreeDocument {
    /// Parses a stored value, rejecting anything that does not have the
    /// document shape or carries an incompatible major version.
    pub fn from_value(value: Value) -> Result<Self> {
        let document: TreeDocument =
            serde_json::from_value(value).map_err(|e| WorkbenchError::malformed(e.to_string()))?;
        document.check_version()?;
        Ok(document)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(NodeRecord::subtree_len).sum()
    }

    fn check_version(&self) -> Result<()> {
        let found = Version::parse(&self.version).map_err(|e| {
            WorkbenchError::malformed(format!("invalid version '{}': {}", self.version, e))
        })?;
        let supported = Version::parse(DOCUMENT_VERSION)
            .map_err(|e| WorkbenchError::internal(e.to_string()))?;
        if found.major != supported.major {
            return Err(WorkbenchError::malformed(format!(
                "unsupported document version {} (expected {}.x)",
                found, supported.major
            )));
        }
        Ok(())
    }
}
