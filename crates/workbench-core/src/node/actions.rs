//! Generic UI verbs and their per-kind handlers.
//!
//! The tree only knows the four verbs. What a verb means is decided by the
//! capability table each node kind hands out.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumIter, EnumString};

use crate::error::{Result, WorkbenchError};
use crate::node::{NodeId, NodeTree};

/// A UI action the host can trigger on any node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum NodeAction {
    Remove,
    View,
    Edit,
    Run,
}

/// Whether a handler changed persisted state.
///
/// `Changed` means the caller should trigger a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Changed,
    Unchanged,
}

/// Host capabilities used by node handlers: prompts, notifications and
/// side effects the tree itself cannot perform.
pub trait NodeUi {
    /// Asks for a line of text. `None` means the prompt was dismissed.
    fn input_box(&self, prompt: &str, value: &str) -> Option<String>;

    fn confirm(&self, message: &str) -> bool;

    fn show_info(&self, message: &str);

    fn show_error(&self, message: &str);

    fn execute_command(&self, command: &str, args: &[String]) -> Result<()>;

    fn open_file(&self, path: &Path) -> Result<()>;
}

pub type ActionHandler = fn(&mut NodeTree, NodeId, &dyn NodeUi) -> Result<ActionOutcome>;

/// Capability table of one node kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub on_remove: Option<ActionHandler>,
    pub on_view: Option<ActionHandler>,
    pub on_edit: Option<ActionHandler>,
    pub on_run: Option<ActionHandler>,
}

impl Capabilities {
    pub fn handler(&self, action: NodeAction) -> Option<ActionHandler> {
        match action {
            NodeAction::Remove => self.on_remove,
            NodeAction::View => self.on_view,
            NodeAction::Edit => self.on_edit,
            NodeAction::Run => self.on_run,
        }
    }

    pub fn supports(&self, action: NodeAction) -> bool {
        self.handler(action).is_some()
    }
}

/// Runs `action` on the node through its kind's capability table.
pub fn dispatch(
    tree: &mut NodeTree,
    id: NodeId,
    action: NodeAction,
    ui: &dyn NodeUi,
) -> Result<ActionOutcome> {
    let handler = {
        let node = tree.node(id)?;
        node.payload()
            .capabilities()
            .handler(action)
            .ok_or_else(|| WorkbenchError::ActionNotSupported {
                action,
                type_tag: node.type_tag().to_string(),
            })?
    };
    handler(tree, id, ui)
}

/// Shared remove handler: asks for confirmation, then drops the subtree.
pub(crate) fn remove_after_confirm(
    tree: &mut NodeTree,
    id: NodeId,
    ui: &dyn NodeUi,
) -> Result<ActionOutcome> {
    let label = tree.node(id)?.label().to_string();
    let descendants = tree.descendant_count(id);
    let message = if descendants == 0 {
        format!("Remove '{}'?", label)
    } else {
        format!("Remove '{}' and its {} descendant(s)?", label, descendants)
    };

    if !ui.confirm(&message) {
        return Ok(ActionOutcome::Unchanged);
    }

    tree.remove(id)?;
    Ok(ActionOutcome::Changed)
}

/// Shared edit handler for kinds whose only editable attribute is the title.
pub(crate) fn rename(tree: &mut NodeTree, id: NodeId, ui: &dyn NodeUi) -> Result<ActionOutcome> {
    let node = tree.node_mut(id)?;
    match ui.input_box("Title", &node.title) {
        Some(title) if !title.trim().is_empty() && title != node.title => {
            node.title = title;
            Ok(ActionOutcome::Changed)
        }
        _ => Ok(ActionOutcome::Unchanged),
    }
}
