use std::path::PathBuf;

use strum::IntoEnumIterator;

use crate::error::Result;
use crate::node::actions::NodeAction;
use crate::node::kinds::{CommandNode, FileNode, FolderNode, NodeKind, NodePayload, NoteNode};
use crate::node::NodeId;
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// One element of the workbench tree.
///
/// Structural links (`parent`, `children`) are owned by [`NodeTree`] and can
/// only be changed through it.
///
/// [`NodeTree`]: crate::node::NodeTree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    type_tag: String,
    pub title: String,
    pub icon: Option<String>,
    is_favorite: bool,
    is_hidden: bool,
    enable_alias: bool,
    alias: Option<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    payload: NodePayload,
    context_value: String,
}

impl Node {
    /// Creates a detached node. Insert it into a [`NodeTree`] to attach it.
    ///
    /// [`NodeTree`]: crate::node::NodeTree
    pub fn new(type_tag: impl Into<String>, title: impl Into<String>, payload: NodePayload) -> Self {
        let mut node = Self {
            id: NodeId::new(),
            type_tag: type_tag.into(),
            title: title.into(),
            icon: None,
            is_favorite: false,
            is_hidden: false,
            enable_alias: false,
            alias: None,
            parent: None,
            children: Vec::new(),
            payload,
            context_value: String::new(),
        };
        node.set_context_value();
        node
    }

    fn of_kind(title: impl Into<String>, payload: NodePayload) -> Self {
        let tag = payload.kind().default_tag();
        Self::new(tag, title, payload)
    }

    pub fn folder(title: impl Into<String>) -> Self {
        Self::of_kind(title, NodePayload::Folder(FolderNode::default()))
    }

    pub fn command(title: impl Into<String>, command: impl Into<String>) -> Self {
        Self::of_kind(title, NodePayload::Command(CommandNode::new(command)))
    }

    pub fn note(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::of_kind(title, NodePayload::Note(NoteNode::new(text)))
    }

    pub fn file(title: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::of_kind(title, NodePayload::File(FileNode::new(path)))
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn kind(&self) -> NodeKind {
        self.payload.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut NodePayload {
        &mut self.payload
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn enable_alias(&self) -> bool {
        self.enable_alias
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Text shown in the view: the alias when enabled and set, else the title.
    pub fn label(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if self.enable_alias && !alias.is_empty() => alias,
            _ => &self.title,
        }
    }

    pub fn set_favorite(&mut self, favorite: bool) {
        self.is_favorite = favorite;
        self.set_context_value();
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
        self.set_context_value();
    }

    pub fn set_enable_alias(&mut self, enabled: bool) {
        self.enable_alias = enabled;
        self.set_context_value();
    }

    /// Sets the alias and enables it; `None` clears and disables it.
    pub fn set_alias(&mut self, alias: Option<String>) {
        self.enable_alias = alias.is_some();
        self.alias = alias;
        self.set_context_value();
    }

    pub fn context_value(&self) -> &str {
        &self.context_value
    }

    /// Recomputes the UI classification string from the current flags and
    /// the kind's capabilities, e.g. `CommandNode#Favorite#NotHidden#Remove#View#Edit#Run`.
    pub fn set_context_value(&mut self) {
        let mut value = self.type_tag.clone();
        value.push_str(if self.is_favorite { "#Favorite" } else { "#NotFavorite" });
        value.push_str(if self.is_hidden { "#Hidden" } else { "#NotHidden" });
        if self.enable_alias {
            value.push_str("#Alias");
        }
        let capabilities = self.payload.capabilities();
        for action in NodeAction::iter().filter(|a| capabilities.supports(*a)) {
            value.push('#');
            value.push_str(&action.to_string());
        }
        self.context_value = value;
    }
}

impl PersistedFields for Node {
    fn write_fields(&self, fields: &mut FieldWriter) -> Result<()> {
        fields.put("id", &self.id)?;
        fields.put("title", &self.title)?;
        fields.put("icon", &self.icon)?;
        fields.put("isFavorite", &self.is_favorite)?;
        fields.put("isHidden", &self.is_hidden)?;
        fields.put("enableAlias", &self.enable_alias)?;
        fields.put("alias", &self.alias)?;
        self.payload.write_fields(fields)
    }

    /// Restores everything except `id`, which the decoder assigns after
    /// checking it for duplicates.
    fn read_fields(&mut self, fields: &FieldReader<'_>) -> Result<()> {
        fields.read_into("title", &mut self.title)?;
        self.icon = fields.get("icon")?;
        fields.read_into("isFavorite", &mut self.is_favorite)?;
        fields.read_into("isHidden", &mut self.is_hidden)?;
        fields.read_into("enableAlias", &mut self.enable_alias)?;
        self.alias = fields.get("alias")?;
        self.payload.read_fields(fields)?;
        self.set_context_value();
        Ok(())
    }
}
