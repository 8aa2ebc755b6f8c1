//! Conversion between the in-memory forest and [`TreeDocument`].

use serde_json::Value;

use crate::error::{Result, WorkbenchError};
use crate::node::{NodeId, NodeTree};
use crate::persist::{FieldReader, FieldWriter, NodeRecord, PersistedFields, TreeDocument};
use crate::registry::NodeRegistry;

/// Something `decode` recovered from without failing the whole document.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeIssue {
    /// The record's type tag is not registered; it and its subtree were dropped.
    UnknownType { type_tag: String, dropped: usize },
    /// The record sits below the deepest allowed level; it and its subtree
    /// were dropped.
    TooDeep { type_tag: String, dropped: usize },
    /// The record had no usable id, or one already taken; a fresh id was assigned.
    ReassignedId {
        type_tag: String,
        previous: Option<Value>,
        assigned: NodeId,
    },
}

/// Result of decoding a document: the rebuilt forest and what was skipped.
#[derive(Debug, Clone, Default)]
pub struct DecodeReport {
    pub tree: NodeTree,
    pub issues: Vec<DecodeIssue>,
}

impl DecodeReport {
    /// Number of records dropped, for unknown type tags or excess depth.
    pub fn dropped(&self) -> usize {
        self.issues
            .iter()
            .map(|issue| match issue {
                DecodeIssue::UnknownType { dropped, .. } | DecodeIssue::TooDeep { dropped, .. } => {
                    *dropped
                }
                DecodeIssue::ReassignedId { .. } => 0,
            })
            .sum()
    }
}

/// Serializes the forest depth-first, pre-order, roots in order.
pub fn encode(tree: &NodeTree) -> Result<TreeDocument> {
    let roots = tree
        .roots()
        .iter()
        .map(|id| encode_node(tree, *id, 0))
        .collect::<Result<Vec<_>>>()?;
    Ok(TreeDocument {
        roots,
        ..TreeDocument::default()
    })
}

fn encode_node(tree: &NodeTree, id: NodeId, depth: usize) -> Result<NodeRecord> {
    if depth >= NodeTree::MAX_DEPTH {
        return Err(WorkbenchError::DepthLimit {
            id,
            limit: NodeTree::MAX_DEPTH,
        });
    }
    let node = tree.node(id)?;
    let mut fields = FieldWriter::new();
    node.write_fields(&mut fields)?;
    let children = node
        .children()
        .iter()
        .map(|child| encode_node(tree, *child, depth + 1))
        .collect::<Result<Vec<_>>>()?;
    Ok(NodeRecord {
        type_tag: node.type_tag().to_string(),
        fields: fields.into_map(),
        children,
    })
}

/// Rebuilds a forest, creating every node through `registry`.
///
/// Unknown type tags, and records nested below [`NodeTree::MAX_DEPTH`], drop
/// the record and its subtree and decoding carries on with the siblings. A persisted field of the wrong type fails the whole
/// document with `MalformedDocument`.
pub fn decode(document: &TreeDocument, registry: &NodeRegistry) -> Result<DecodeReport> {
    let mut report = DecodeReport::default();
    for record in &document.roots {
        decode_node(record, None, 0, registry, &mut report)?;
    }
    Ok(report)
}

fn decode_node(
    record: &NodeRecord,
    parent: Option<NodeId>,
    depth: usize,
    registry: &NodeRegistry,
    report: &mut DecodeReport,
) -> Result<()> {
    if depth >= NodeTree::MAX_DEPTH {
        report.issues.push(DecodeIssue::TooDeep {
            type_tag: record.type_tag.clone(),
            dropped: record.subtree_len(),
        });
        return Ok(());
    }

    let mut node = match registry.create(&record.type_tag) {
        Ok(node) => node,
        Err(e) if e.is_unknown_type() => {
            report.issues.push(DecodeIssue::UnknownType {
                type_tag: record.type_tag.clone(),
                dropped: record.subtree_len(),
            });
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let fields = FieldReader::new(&record.type_tag, &record.fields);
    node.read_fields(&fields)?;

    match fields.get::<NodeId>("id") {
        Ok(Some(id)) if !report.tree.contains(id) => node.set_id(id),
        _ => report.issues.push(DecodeIssue::ReassignedId {
            type_tag: record.type_tag.clone(),
            previous: record.fields.get("id").cloned(),
            assigned: node.id(),
        }),
    }

    let id = report.tree.insert(node, parent)?;
    for child in &record.children {
        decode_node(child, Some(id), depth + 1, registry, report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CommandNode, Node, NodeKind, NodePayload};
    use serde_json::json;

    fn build_forest() -> (NodeTree, NodeId, NodeId, NodeId) {
        let mut tree = NodeTree::new();
        let a = tree.insert(Node::folder("A").with_icon("folder"), None).unwrap();
        let b = tree.insert(Node::command("B", "workbench.action.b"), Some(a)).unwrap();
        let c = tree.insert(Node::note("C", "remember"), Some(a)).unwrap();
        tree.insert(Node::file("D", "/tmp/d.json"), None).unwrap();
        (tree, a, b, c)
    }

    fn round_trip(tree: &NodeTree) -> DecodeReport {
        let value = encode(tree).unwrap().to_value().unwrap();
        let document = TreeDocument::from_value(value).unwrap();
        decode(&document, &NodeRegistry::with_builtin_types()).unwrap()
    }

    #[test]
    fn test_round_trip_preserves_structure_and_order() {
        let (tree, a, b, c) = build_forest();

        let report = round_trip(&tree);
        let loaded = report.tree;

        assert!(report.issues.is_empty());
        assert_eq!(loaded.roots().len(), 2);
        assert_eq!(loaded.roots()[0], a);
        assert_eq!(loaded.children(a), &[b, c]);
        assert_eq!(loaded.parent(b), Some(a));
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_round_trip_preserves_persisted_fields() {
        let (mut tree, a, b, _) = build_forest();
        {
            let node = tree.node_mut(b).unwrap();
            node.set_favorite(true);
            node.set_hidden(true);
            node.set_alias(Some("Build".to_string()));
            if let NodePayload::Command(command) = node.payload_mut() {
                command.args = vec!["--fast".to_string()];
            }
        }

        let loaded = round_trip(&tree).tree;

        for original in tree.iter_preorder() {
            let restored = loaded.node(original.id()).unwrap();
            let mut expected = FieldWriter::new();
            let mut actual = FieldWriter::new();
            original.write_fields(&mut expected).unwrap();
            restored.write_fields(&mut actual).unwrap();
            assert_eq!(expected.into_map(), actual.into_map());
            assert_eq!(restored.type_tag(), original.type_tag());
            assert_eq!(restored.context_value(), original.context_value());
        }
        assert_eq!(loaded.node(a).unwrap().icon.as_deref(), Some("folder"));
    }

    #[test]
    fn test_transient_fields_reset_on_load() {
        let mut tree = NodeTree::new();
        let mut node = Node::command("Run", "workbench.action.run");
        if let NodePayload::Command(command) = node.payload_mut() {
            command.run_count = 7;
        }
        let id = tree.insert(node, None).unwrap();

        let loaded = round_trip(&tree).tree;
        match loaded.node(id).unwrap().payload() {
            NodePayload::Command(command) => {
                assert_eq!(command.run_count, 0);
                assert_eq!(command.command, "workbench.action.run");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_custom_tag_restores_command_field() {
        let mut registry = NodeRegistry::new();
        registry
            .register("Cmd", || NodePayload::Command(CommandNode::default()))
            .unwrap();

        let mut tree = NodeTree::new();
        let mut node = registry.create("Cmd").unwrap();
        node.title = "Foo".to_string();
        if let NodePayload::Command(command) = node.payload_mut() {
            command.command = "workbench.action.foo".to_string();
        }
        let id = tree.insert(node, None).unwrap();

        let document = encode(&tree).unwrap();
        assert_eq!(document.roots[0].type_tag, "Cmd");

        let loaded = decode(&document, &registry).unwrap().tree;
        let restored = loaded.node(id).unwrap();
        assert_eq!(restored.type_tag(), "Cmd");
        match restored.payload() {
            NodePayload::Command(command) => assert_eq!(command.command, "workbench.action.foo"),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_drops_only_that_subtree() {
        let value = json!({
            "roots": [
                { "typeTag": "FolderNode", "fields": { "title": "S3" }, "children": [] },
                { "typeTag": "LambdaNode", "fields": { "title": "fn" }, "children": [
                    { "typeTag": "NoteNode", "fields": {}, "children": [] }
                ] },
                { "typeTag": "NoteNode", "fields": { "title": "Todo", "text": "x" }, "children": [] }
            ]
        });
        let document = TreeDocument::from_value(value).unwrap();

        let report = decode(&document, &NodeRegistry::with_builtin_types()).unwrap();

        assert_eq!(report.tree.roots().len(), 2);
        assert_eq!(report.dropped(), 2);
        let titles: Vec<&str> = report
            .tree
            .roots()
            .iter()
            .map(|id| report.tree.node(*id).unwrap().title.as_str())
            .collect();
        assert_eq!(titles, vec!["S3", "Todo"]);
    }

    #[test]
    fn test_duplicate_or_missing_ids_are_reassigned() {
        let id = NodeId::new().to_string();
        let value = json!({
            "roots": [
                { "typeTag": "FolderNode", "fields": { "id": id, "title": "first" }, "children": [] },
                { "typeTag": "FolderNode", "fields": { "id": id, "title": "second" }, "children": [] },
                { "typeTag": "FolderNode", "fields": { "title": "third" }, "children": [] }
            ]
        });
        let document = TreeDocument::from_value(value).unwrap();

        let report = decode(&document, &NodeRegistry::with_builtin_types()).unwrap();

        assert_eq!(report.tree.len(), 3);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.tree.roots()[0].to_string(), id);
        assert!(report.tree.validate().is_ok());
    }

    #[test]
    fn test_wrongly_typed_field_fails_document() {
        let value = json!({
            "roots": [ { "typeTag": "CommandNode", "fields": { "command": ["not", "a", "string"] }, "children": [] } ]
        });
        let document = TreeDocument::from_value(value).unwrap();
        let err = decode(&document, &NodeRegistry::with_builtin_types()).unwrap_err();
        assert!(err.is_malformed());
    }

    fn chain(levels: usize) -> (NodeTree, Vec<NodeId>) {
        let mut tree = NodeTree::new();
        let mut ids = Vec::new();
        for level in 0..levels {
            let parent = ids.last().copied();
            ids.push(tree.insert(Node::folder(format!("level-{}", level)), parent).unwrap());
        }
        (tree, ids)
    }

    #[test]
    fn test_deepest_allowed_chain_survives_json_text() {
        let (tree, ids) = chain(NodeTree::MAX_DEPTH);

        let text = serde_json::to_string_pretty(&encode(&tree).unwrap().to_value().unwrap()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let loaded = decode(
            &TreeDocument::from_value(value).unwrap(),
            &NodeRegistry::with_builtin_types(),
        )
        .unwrap();

        assert!(loaded.issues.is_empty());
        assert_eq!(loaded.tree.len(), NodeTree::MAX_DEPTH);
        assert_eq!(loaded.tree.depth(ids[ids.len() - 1]), NodeTree::MAX_DEPTH - 1);
    }

    #[test]
    fn test_records_below_max_depth_are_dropped() {
        let mut record = json!({ "typeTag": "NoteNode", "fields": { "title": "bottom" }, "children": [] });
        for level in 0..NodeTree::MAX_DEPTH {
            record = json!({
                "typeTag": "FolderNode",
                "fields": { "title": format!("level-{}", level) },
                "children": [record]
            });
        }
        let document = TreeDocument::from_value(json!({ "roots": [record] })).unwrap();

        let report = decode(&document, &NodeRegistry::with_builtin_types()).unwrap();

        assert_eq!(report.tree.len(), NodeTree::MAX_DEPTH);
        assert_eq!(report.dropped(), 1);
        assert!(matches!(report.issues[0], DecodeIssue::TooDeep { .. }));
        assert!(report.tree.iter_preorder().all(|node| node.title != "bottom"));
    }

    #[test]
    fn test_encode_emits_preorder_with_kind_fields() {
        let (tree, _, _, _) = build_forest();
        let document = encode(&tree).unwrap();

        let root = &document.roots[0];
        assert_eq!(root.type_tag, NodeKind::Folder.default_tag());
        assert_eq!(root.children[0].fields["command"], json!("workbench.action.b"));
        assert_eq!(root.children[1].fields["text"], json!("remember"));
        assert_eq!(document.node_count(), 4);
    }
}
