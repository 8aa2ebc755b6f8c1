use anyhow::{Result, bail};
use colored::Colorize;
use std::sync::Arc;
use workbench_core::config::WorkbenchConfig;
use workbench_core::node::{
    ActionOutcome, Node, NodeAction, NodeId, NodeKind, NodeTree, TreeFilter, dispatch,
};
use workbench_core::registry::NodeRegistry;
use workbench_infrastructure::{JsonFileStorage, TreeState, WorkbenchPaths};

use crate::Commands;
use crate::ui::ConsoleUi;

/// Loads the tree, applies one command and persists the result before exit.
pub async fn execute(
    command: Commands,
    paths: &WorkbenchPaths,
    config: &WorkbenchConfig,
) -> Result<()> {
    let registry = NodeRegistry::with_builtin_types();
    if let Commands::Types = command {
        for tag in registry.type_tags() {
            println!("{}", tag);
        }
        return Ok(());
    }

    let storage = Arc::new(JsonFileStorage::new(paths.state_dir()));
    let state = TreeState::spawn(storage, &config.tree_state);
    let mut tree = state.load(&registry).await;

    let result = apply(command, &mut tree);
    if let Ok(true) = result {
        state.save_immediate(&tree).await;
    }
    state.shutdown().await;

    result.map(|_| ())
}

/// Applies `command` to the tree. Returns whether persisted state changed.
fn apply(command: Commands, tree: &mut NodeTree) -> Result<bool> {
    match command {
        Commands::Show {
            all,
            favorites,
            filter,
        } => {
            let filter = TreeFilter {
                show_hidden: all,
                favorites_only: favorites,
                text: filter,
            };
            print_tree(tree, &filter);
            Ok(false)
        }
        Commands::Add {
            kind,
            title,
            parent,
            value,
        } => {
            let parent = parent.map(|p| resolve_id(tree, &p)).transpose()?;
            let value = value.unwrap_or_default();
            let node = match kind {
                NodeKind::Folder => Node::folder(title),
                NodeKind::Command => Node::command(title, value),
                NodeKind::Note => Node::note(title, value),
                NodeKind::File => Node::file(title, value),
            };
            let id = tree.insert(node, parent)?;
            println!("Added {}", id.short());
            Ok(true)
        }
        Commands::Remove { id, yes } => {
            let id = resolve_id(tree, &id)?;
            run_action(tree, id, NodeAction::Remove, ConsoleUi::new(yes, None))
        }
        Commands::Move { id, parent, index } => {
            let id = resolve_id(tree, &id)?;
            let parent = parent.map(|p| resolve_id(tree, &p)).transpose()?;
            tree.move_node(id, parent, index)?;
            Ok(true)
        }
        Commands::Favorite { id, off } => {
            let id = resolve_id(tree, &id)?;
            tree.node_mut(id)?.set_favorite(!off);
            Ok(true)
        }
        Commands::Hide { id, off } => {
            let id = resolve_id(tree, &id)?;
            tree.node_mut(id)?.set_hidden(!off);
            Ok(true)
        }
        Commands::Alias { id, alias } => {
            let id = resolve_id(tree, &id)?;
            tree.node_mut(id)?
                .set_alias(alias.filter(|alias| !alias.is_empty()));
            Ok(true)
        }
        Commands::View { id } => {
            let id = resolve_id(tree, &id)?;
            run_action(tree, id, NodeAction::View, ConsoleUi::new(false, None))
        }
        Commands::Edit { id, value } => {
            let id = resolve_id(tree, &id)?;
            run_action(tree, id, NodeAction::Edit, ConsoleUi::new(false, Some(value)))
        }
        Commands::Run { id } => {
            let id = resolve_id(tree, &id)?;
            run_action(tree, id, NodeAction::Run, ConsoleUi::new(false, None))
        }
        Commands::Types => Ok(false),
    }
}

fn run_action(tree: &mut NodeTree, id: NodeId, action: NodeAction, ui: ConsoleUi) -> Result<bool> {
    let outcome = dispatch(tree, id, action, &ui)?;
    Ok(outcome == ActionOutcome::Changed)
}

/// Accepts a full id or any prefix, with or without hyphens, matching
/// exactly one node.
fn resolve_id(tree: &NodeTree, input: &str) -> Result<NodeId> {
    if let Ok(id) = input.parse::<NodeId>() {
        if tree.contains(id) {
            return Ok(id);
        }
    }

    let needle = input.to_lowercase();
    let matches: Vec<NodeId> = tree
        .iter_preorder()
        .map(|node| node.id())
        .filter(|id| {
            id.to_string().starts_with(&needle)
                || id.as_uuid().simple().to_string().starts_with(&needle)
        })
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No node matches '{}'", input),
        _ => bail!("'{}' matches {} nodes", input, matches.len()),
    }
}

fn print_tree(tree: &NodeTree, filter: &TreeFilter) {
    if tree.visible_children(None, filter).is_empty() {
        println!("{}", "(empty)".dimmed());
        return;
    }
    print_level(tree, None, filter, 0);
}

fn print_level(tree: &NodeTree, parent: Option<NodeId>, filter: &TreeFilter, depth: usize) {
    for id in tree.visible_children(parent, filter) {
        let Some(node) = tree.get(id) else {
            continue;
        };

        let mut line = format!("{}{}", "  ".repeat(depth), node.label());
        if node.is_favorite() {
            line.push_str(&format!(" {}", "★".yellow()));
        }
        if node.is_hidden() {
            line.push_str(&format!(" {}", "(hidden)".dimmed()));
        }
        println!(
            "{}  {} {}",
            line,
            format!("[{}]", node.type_tag()).dimmed(),
            id.short().dimmed()
        );

        print_level(tree, Some(id), filter, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (NodeTree, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let folder = tree.insert(Node::folder("Lambda"), None).unwrap();
        let command = tree
            .insert(Node::command("Deploy", "workbench.action.deploy"), Some(folder))
            .unwrap();
        (tree, folder, command)
    }

    #[test]
    fn test_resolve_id_by_full_id_and_prefix() {
        let (tree, folder, _) = sample();

        assert_eq!(resolve_id(&tree, &folder.to_string()).unwrap(), folder);
        assert_eq!(resolve_id(&tree, &folder.short()).unwrap(), folder);
        assert!(resolve_id(&tree, "zzzz").is_err());
    }

    #[test]
    fn test_resolve_id_by_long_prefix_without_hyphens() {
        let (tree, _, command) = sample();
        let simple = command.as_uuid().simple().to_string();

        assert_eq!(resolve_id(&tree, &simple[..12]).unwrap(), command);
        assert_eq!(resolve_id(&tree, &simple.to_uppercase()[..12]).unwrap(), command);
    }

    #[test]
    fn test_add_under_parent_marks_changed() {
        let (mut tree, folder, command) = sample();

        let changed = apply(
            Commands::Add {
                kind: NodeKind::Note,
                title: "Todo".to_string(),
                parent: Some(folder.to_string()),
                value: Some("check timeouts".to_string()),
            },
            &mut tree,
        )
        .unwrap();

        assert!(changed);
        assert_eq!(tree.children(folder).len(), 2);
        assert_eq!(tree.children(folder)[0], command);
    }

    #[test]
    fn test_favorite_and_alias() {
        let (mut tree, folder, _) = sample();

        apply(
            Commands::Favorite {
                id: folder.to_string(),
                off: false,
            },
            &mut tree,
        )
        .unwrap();
        apply(
            Commands::Alias {
                id: folder.to_string(),
                alias: Some("Functions".to_string()),
            },
            &mut tree,
        )
        .unwrap();

        let node = tree.node(folder).unwrap();
        assert!(node.is_favorite());
        assert_eq!(node.label(), "Functions");
    }

    #[test]
    fn test_move_into_own_child_fails() {
        let (mut tree, folder, command) = sample();

        let result = apply(
            Commands::Move {
                id: folder.to_string(),
                parent: Some(command.to_string()),
                index: None,
            },
            &mut tree,
        );

        assert!(result.is_err());
        assert_eq!(tree.roots(), &[folder]);
    }

    #[test]
    fn test_run_does_not_change_persisted_state() {
        let (mut tree, _, command) = sample();

        let changed = apply(
            Commands::Run {
                id: command.to_string(),
            },
            &mut tree,
        )
        .unwrap();

        assert!(!changed);
    }
}
