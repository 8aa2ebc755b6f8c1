//! Concrete node kinds.
//!
//! The set is closed: `NodePayload` is the tagged union and `NodeKind` its
//! discriminant. Each kind module supplies its fields, its persisted-field
//! declaration and its capability table.

mod command;
mod file;
mod folder;
mod note;

pub use command::CommandNode;
pub use file::FileNode;
pub use folder::FolderNode;
pub use note::NoteNode;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::node::actions::Capabilities;
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// Discriminant of [`NodePayload`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum NodeKind {
    Folder,
    Command,
    Note,
    File,
}

impl NodeKind {
    /// Type tag used when a node of this kind is built without a registry.
    pub fn default_tag(&self) -> &'static str {
        match self {
            NodeKind::Folder => "FolderNode",
            NodeKind::Command => "CommandNode",
            NodeKind::Note => "NoteNode",
            NodeKind::File => "FileNode",
        }
    }

    /// Field-default payload of this kind.
    pub fn empty_payload(&self) -> NodePayload {
        match self {
            NodeKind::Folder => NodePayload::Folder(FolderNode::default()),
            NodeKind::Command => NodePayload::Command(CommandNode::default()),
            NodeKind::Note => NodePayload::Note(NoteNode::default()),
            NodeKind::File => NodePayload::File(FileNode::default()),
        }
    }
}

/// Kind-specific state of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Folder(FolderNode),
    Command(CommandNode),
    Note(NoteNode),
    File(FileNode),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Folder(_) => NodeKind::Folder,
            NodePayload::Command(_) => NodeKind::Command,
            NodePayload::Note(_) => NodeKind::Note,
            NodePayload::File(_) => NodeKind::File,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            NodePayload::Folder(_) => FolderNode::capabilities(),
            NodePayload::Command(_) => CommandNode::capabilities(),
            NodePayload::Note(_) => NoteNode::capabilities(),
            NodePayload::File(_) => FileNode::capabilities(),
        }
    }

    fn as_fields(&self) -> &dyn PersistedFields {
        match self {
            NodePayload::Folder(p) => p,
            NodePayload::Command(p) => p,
            NodePayload::Note(p) => p,
            NodePayload::File(p) => p,
        }
    }

    fn as_fields_mut(&mut self) -> &mut dyn PersistedFields {
        match self {
            NodePayload::Folder(p) => p,
            NodePayload::Command(p) => p,
            NodePayload::Note(p) => p,
            NodePayload::File(p) => p,
        }
    }
}

impl PersistedFields for NodePayload {
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()> {
        self.as_fields().write_fields(fields)
    }

    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()> {
        self.as_fields_mut().read_fields(fields)
    }
}
