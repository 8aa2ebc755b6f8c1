use crate::error::{Result, WorkbenchError};
use crate::node::actions::{self, ActionOutcome, Capabilities, NodeUi};
use crate::node::{NodeId, NodePayload, NodeTree};
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// Runs a host command with fixed arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandNode {
    pub command: String,
    pub args: Vec<String>,
    /// Number of runs in this process; transient.
    pub run_count: u32,
}

impl CommandNode {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            on_remove: Some(actions::remove_after_confirm),
            on_view: Some(view),
            on_edit: Some(edit),
            on_run: Some(run),
        }
    }
}

impl PersistedFields for CommandNode {
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()> {
        fields.put("command", &self.command)?;
        fields.put("args", &self.args)
    }

    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()> {
        fields.read_into("command", &mut self.command)?;
        fields.read_into("args", &mut self.args)
    }
}

fn command_of(tree: &mut NodeTree, id: NodeId) -> Result<&mut CommandNode> {
    match tree.node_mut(id)?.payload_mut() {
        NodePayload::Command(command) => Ok(command),
        other => Err(WorkbenchError::internal(format!(
            "command handler invoked on {} node",
            other.kind()
        ))),
    }
}

fn view(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let command = command_of(tree, id)?;
    if command.args.is_empty() {
        ui.show_info(&command.command);
    } else {
        ui.show_info(&format!("{} {}", command.command, command.args.join(" ")));
    }
    Ok(ActionOutcome::Unchanged)
}

fn edit(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let command = command_of(tree, id)?;
    let answer = ui.input_box("Command", &command.command);
    match answer.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() && value != command.command => {
            command.command = value.to_string();
            Ok(ActionOutcome::Changed)
        }
        _ => Ok(ActionOutcome::Unchanged),
    }
}

fn run(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let command = command_of(tree, id)?;
    if command.command.is_empty() {
        ui.show_error("No command set");
        return Ok(ActionOutcome::Unchanged);
    }
    ui.execute_command(&command.command, &command.args)?;
    command.run_count += 1;
    // run_count is transient, nothing to persist
    Ok(ActionOutcome::Unchanged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::actions::test_support::ScriptedUi;
    use crate::node::{Node, NodeAction, dispatch};

    fn tree_with_command(command: &str) -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let id = tree.insert(Node::command("Open", command), None).unwrap();
        (tree, id)
    }

    #[test]
    fn test_run_executes_through_host() {
        let (mut tree, id) = tree_with_command("workbench.action.foo");
        let ui = ScriptedUi::default();

        let outcome = dispatch(&mut tree, id, NodeAction::Run, &ui).unwrap();

        assert_eq!(outcome, ActionOutcome::Unchanged);
        assert_eq!(ui.executed.borrow()[0].0, "workbench.action.foo");
        match tree.node(id).unwrap().payload() {
            NodePayload::Command(command) => assert_eq!(command.run_count, 1),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_edit_with_only_surrounding_whitespace_is_unchanged() {
        let (mut tree, id) = tree_with_command("workbench.action.foo");

        let outcome = dispatch(
            &mut tree,
            id,
            NodeAction::Edit,
            &ScriptedUi::answering(" workbench.action.foo "),
        )
        .unwrap();

        assert_eq!(outcome, ActionOutcome::Unchanged);
    }

    #[test]
    fn test_edit_replaces_command() {
        let (mut tree, id) = tree_with_command("workbench.action.foo");

        let outcome = dispatch(
            &mut tree,
            id,
            NodeAction::Edit,
            &ScriptedUi::answering("workbench.action.bar "),
        )
        .unwrap();

        assert_eq!(outcome, ActionOutcome::Changed);
        match tree.node(id).unwrap().payload() {
            NodePayload::Command(command) => assert_eq!(command.command, "workbench.action.bar"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_run_without_command_does_nothing() {
        let (mut tree, id) = tree_with_command("");
        let ui = ScriptedUi::default();

        dispatch(&mut tree, id, NodeAction::Run, &ui).unwrap();
        assert!(ui.executed.borrow().is_empty());
    }
}
