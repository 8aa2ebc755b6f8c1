use std::path::PathBuf;

use crate::error::{Result, WorkbenchError};
use crate::node::actions::{self, ActionOutcome, Capabilities, NodeUi};
use crate::node::{NodeId, NodePayload, NodeTree};
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// Shortcut to a local file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileNode {
    pub path: PathBuf,
}

impl FileNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            on_remove: Some(actions::remove_after_confirm),
            on_view: Some(open),
            on_edit: Some(edit),
            on_run: Some(open),
        }
    }
}

impl PersistedFields for FileNode {
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()> {
        fields.put("path", &self.path)
    }

    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()> {
        fields.read_into("path", &mut self.path)
    }
}

fn file_of(tree: &mut NodeTree, id: NodeId) -> Result<&mut FileNode> {
    match tree.node_mut(id)?.payload_mut() {
        NodePayload::File(file) => Ok(file),
        other => Err(WorkbenchError::internal(format!(
            "file handler invoked on {} node",
            other.kind()
        ))),
    }
}

fn open(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let file = file_of(tree, id)?;
    if file.path.as_os_str().is_empty() {
        ui.show_error("No file path set");
        return Ok(ActionOutcome::Unchanged);
    }
    ui.open_file(&file.path)?;
    Ok(ActionOutcome::Unchanged)
}

fn edit(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let file = file_of(tree, id)?;
    let current = file.path.to_string_lossy().to_string();
    let answer = ui.input_box("File path", &current);
    match answer.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() && path != current => {
            file.path = PathBuf::from(path);
            Ok(ActionOutcome::Changed)
        }
        _ => Ok(ActionOutcome::Unchanged),
    }
}
