//! The in-memory forest.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, WorkbenchError};
use crate::node::{Node, NodeId};

/// Arena of nodes plus the ordered list of forest roots.
///
/// The arena is the single owner of every node. Parent and child links are
/// ids, and every structural change goes through this type so the
/// back-references stay consistent.
#[derive(Debug, Clone, Default)]
pub struct NodeTree {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
}

/// What [`NodeTree::remove`] took out of the forest.
#[derive(Debug, Clone)]
pub struct RemovedSubtree {
    /// The removed node, with its parent link cleared.
    pub root: Node,
    /// Every descendant that was dropped with it, in pre-order.
    pub descendants: Vec<Node>,
}

/// View filter applied by [`NodeTree::visible_children`].
#[derive(Debug, Clone, Default)]
pub struct TreeFilter {
    pub show_hidden: bool,
    pub favorites_only: bool,
    pub text: Option<String>,
}

impl TreeFilter {
    fn matches(&self, node: &Node) -> bool {
        if self.favorites_only && !node.is_favorite() {
            return false;
        }
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => node
                .label()
                .to_lowercase()
                .contains(&text.to_lowercase()),
            _ => true,
        }
    }
}

impl NodeTree {
    /// Number of levels a forest may have. Roots are level one.
    ///
    /// Keeps every saved document well inside the nesting limit of the JSON
    /// reader, so whatever is saved can be loaded back.
    pub const MAX_DEPTH: usize = 48;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Like [`get`](Self::get) but fails with `NodeNotFound`.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(WorkbenchError::not_found(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(WorkbenchError::not_found(id))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in display order; empty for an unknown id.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    /// Attaches a detached node as the last child of `parent`, or as the
    /// last root when `parent` is `None`.
    pub fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> Result<NodeId> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(WorkbenchError::DuplicateNode { id });
        }

        if let Some(parent_id) = parent {
            self.node(parent_id)?;
            self.check_depth(id, self.depth(parent_id) + 1)?;
        }

        match parent {
            Some(parent_id) => self.node_mut(parent_id)?.children.push(id),
            None => self.roots.push(id),
        }

        node.parent = parent;
        node.children.clear();
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Detaches `id` from its parent (or from the roots) and drops its whole
    /// subtree from the forest.
    pub fn remove(&mut self, id: NodeId) -> Result<RemovedSubtree> {
        let parent = self.node(id)?.parent;
        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }

        let descendant_ids = self.descendants(id);
        let mut root = self
            .nodes
            .remove(&id)
            .ok_or(WorkbenchError::not_found(id))?;
        root.parent = None;

        let descendants = descendant_ids
            .iter()
            .filter_map(|descendant| self.nodes.remove(descendant))
            .collect();

        Ok(RemovedSubtree { root, descendants })
    }

    /// Reparents `id` under `new_parent` (or to the roots) at `index`,
    /// appending when `index` is `None` or past the end.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<()> {
        let old_parent = self.node(id)?.parent;
        if let Some(parent_id) = new_parent {
            self.node(parent_id)?;
            if parent_id == id || self.is_ancestor(id, parent_id) {
                return Err(WorkbenchError::Cycle {
                    node: id,
                    parent: parent_id,
                });
            }
        }
        let new_depth = new_parent.map_or(0, |parent_id| self.depth(parent_id) + 1);
        self.check_depth(id, new_depth + self.subtree_height(id))?;

        match old_parent {
            Some(parent_id) => self.node_mut(parent_id)?.children.retain(|c| *c != id),
            None => self.roots.retain(|root| *root != id),
        }

        let siblings = match new_parent {
            Some(parent_id) => &mut self.node_mut(parent_id)?.children,
            None => &mut self.roots,
        };
        let index = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(index, id);

        self.node_mut(id)?.parent = new_parent;
        Ok(())
    }

    /// True when `ancestor` lies on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            // a corrupted chain cannot be longer than the arena
            if chain.len() > self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = self.parent(parent);
        }
        chain
    }

    /// Number of parent links between `id` and its root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).len()
    }

    /// Every node below `id`, in pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn descendant_count(&self, id: NodeId) -> usize {
        self.descendants(id).len()
    }

    /// Levels below `id`; zero for a leaf.
    pub fn subtree_height(&self, id: NodeId) -> usize {
        let mut height = 0;
        let mut stack = vec![(id, 0)];
        while let Some((current, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(self.children(current).iter().map(|child| (*child, level + 1)));
        }
        height
    }

    /// Fails unless `depth` (roots are 0) is below [`Self::MAX_DEPTH`].
    fn check_depth(&self, id: NodeId, depth: usize) -> Result<()> {
        if depth >= Self::MAX_DEPTH {
            return Err(WorkbenchError::DepthLimit {
                id,
                limit: Self::MAX_DEPTH,
            });
        }
        Ok(())
    }

    /// Depth-first pre-order walk over the whole forest.
    pub fn iter_preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Children of `parent` (roots for `None`) that the view should show.
    ///
    /// Hidden nodes are dropped unless `show_hidden`. A node passes the
    /// favorite/text filter when it matches itself or leads to a visible
    /// match further down. Contents of a match are not shown unless they
    /// match too.
    pub fn visible_children(&self, parent: Option<NodeId>, filter: &TreeFilter) -> Vec<NodeId> {
        let candidates = match parent {
            Some(parent_id) => self.children(parent_id),
            None => self.roots.as_slice(),
        };
        candidates
            .iter()
            .copied()
            .filter(|id| self.is_visible(*id, filter))
            .collect()
    }

    fn is_visible(&self, id: NodeId, filter: &TreeFilter) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        if node.is_hidden() && !filter.show_hidden {
            return false;
        }
        filter.matches(node)
            || node
                .children
                .iter()
                .any(|child| self.is_visible(*child, filter))
    }

    /// Checks the structural invariants: back-references agree with the
    /// children lists, roots have no parent, no node is its own ancestor.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for root in &self.roots {
            let node = self.node(*root)?;
            if node.parent.is_some() {
                return Err(WorkbenchError::internal(format!(
                    "root {} has a parent link",
                    root
                )));
            }
            if !seen.insert(*root) {
                return Err(WorkbenchError::internal(format!("root {} listed twice", root)));
            }
        }

        for (id, node) in &self.nodes {
            match node.parent {
                None if !self.roots.contains(id) => {
                    return Err(WorkbenchError::internal(format!(
                        "orphan {} is neither a root nor a child",
                        id
                    )));
                }
                Some(parent) if !self.children(parent).contains(id) => {
                    return Err(WorkbenchError::internal(format!(
                        "{} points at parent {} which does not list it",
                        id, parent
                    )));
                }
                _ => {}
            }

            for child in &node.children {
                if self.node(*child)?.parent != Some(*id) {
                    return Err(WorkbenchError::internal(format!(
                        "child {} of {} has a different parent link",
                        child, id
                    )));
                }
                if !seen.insert(*child) {
                    return Err(WorkbenchError::internal(format!(
                        "{} is reachable twice",
                        child
                    )));
                }
            }

            if self.ancestors(*id).contains(id) {
                return Err(WorkbenchError::internal(format!("{} is its own ancestor", id)));
            }
        }

        Ok(())
    }
}

/// Pre-order iterator returned by [`NodeTree::iter_preorder`].
pub struct Preorder<'a> {
    tree: &'a NodeTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.nodes.get(&id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}
