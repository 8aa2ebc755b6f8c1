use crate::error::{Result, WorkbenchError};
use crate::node::actions::{self, ActionOutcome, Capabilities, NodeUi};
use crate::node::{NodeId, NodePayload, NodeTree};
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// Free-form text attached to the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteNode {
    pub text: String,
}

impl NoteNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            on_remove: Some(actions::remove_after_confirm),
            on_view: Some(view),
            on_edit: Some(edit),
            on_run: None,
        }
    }
}

impl PersistedFields for NoteNode {
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()> {
        fields.put("text", &self.text)
    }

    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()> {
        fields.read_into("text", &mut self.text)
    }
}

fn note_of(tree: &mut NodeTree, id: NodeId) -> Result<&mut NoteNode> {
    match tree.node_mut(id)?.payload_mut() {
        NodePayload::Note(note) => Ok(note),
        other => Err(WorkbenchError::internal(format!(
            "note handler invoked on {} node",
            other.kind()
        ))),
    }
}

fn view(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let note = note_of(tree, id)?;
    ui.show_info(&note.text);
    Ok(ActionOutcome::Unchanged)
}

fn edit(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let note = note_of(tree, id)?;
    match ui.input_box("Note", &note.text) {
        Some(text) if text != note.text => {
            note.text = text;
            Ok(ActionOutcome::Changed)
        }
        _ => Ok(ActionOutcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::actions::test_support::ScriptedUi;
    use crate::node::{Node, NodeAction, dispatch};

    #[test]
    fn test_view_shows_text() {
        let mut tree = NodeTree::new();
        let id = tree
            .insert(Node::note("Todo", "rotate access keys"), None)
            .unwrap();
        let ui = ScriptedUi::default();

        dispatch(&mut tree, id, NodeAction::View, &ui).unwrap();
        assert_eq!(ui.infos.borrow().as_slice(), ["rotate access keys"]);
    }

    #[test]
    fn test_note_cannot_run() {
        let mut tree = NodeTree::new();
        let id = tree.insert(Node::note("Todo", ""), None).unwrap();
        assert!(dispatch(&mut tree, id, NodeAction::Run, &ScriptedUi::default()).is_err());
    }
}
