//! Type tag to node factory lookup used when rebuilding persisted nodes.

use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::error::{Result, WorkbenchError};
use crate::node::{Node, NodeKind, NodePayload};

/// Produces the field-default payload of one node kind.
pub type NodeFactory = fn() -> NodePayload;

/// Append-only mapping from type tag to [`NodeFactory`].
///
/// Built once at startup and passed to whoever needs to create nodes by tag;
/// there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    factories: BTreeMap<String, NodeFactory>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in kind under its default tag.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for kind in NodeKind::iter() {
            registry
                .factories
                .insert(kind.default_tag().to_string(), builtin_factory(kind));
        }
        registry
    }

    /// Registers `factory` under `type_tag`.
    ///
    /// A tag can be registered only once; a second registration fails with
    /// `DuplicateType` and leaves the first one in place.
    pub fn register(&mut self, type_tag: impl Into<String>, factory: NodeFactory) -> Result<()> {
        let type_tag = type_tag.into();
        if self.factories.contains_key(&type_tag) {
            return Err(WorkbenchError::DuplicateType { type_tag });
        }
        self.factories.insert(type_tag, factory);
        Ok(())
    }

    /// Builds a fresh, field-default node of the type registered under `type_tag`.
    pub fn create(&self, type_tag: &str) -> Result<Node> {
        let factory = self
            .factories
            .get(type_tag)
            .ok_or_else(|| WorkbenchError::unknown_type(type_tag))?;
        Ok(Node::new(type_tag, String::new(), factory()))
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.factories.contains_key(type_tag)
    }

    /// Registered tags in sorted order.
    pub fn type_tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

fn builtin_factory(kind: NodeKind) -> NodeFactory {
    match kind {
        NodeKind::Folder => new_folder,
        NodeKind::Command => new_command,
        NodeKind::Note => new_note,
        NodeKind::File => new_file,
    }
}

fn new_folder() -> NodePayload {
    NodeKind::Folder.empty_payload()
}

fn new_command() -> NodePayload {
    NodeKind::Command.empty_payload()
}

fn new_note() -> NodePayload {
    NodeKind::Note.empty_payload()
}

fn new_file() -> NodePayload {
    NodeKind::File.empty_payload()
}
