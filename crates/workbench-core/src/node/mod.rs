//! Node model: identity, kinds, the forest and UI actions.

pub mod actions;
mod id;
pub mod kinds;
mod model;
mod tree;

pub use actions::{dispatch, ActionHandler, ActionOutcome, Capabilities, NodeAction, NodeUi};
pub use id::NodeId;
pub use kinds::{CommandNode, FileNode, FolderNode, NodeKind, NodePayload, NoteNode};
pub use model::Node;
pub use tree::{NodeTree, Preorder, RemovedSubtree, TreeFilter};
