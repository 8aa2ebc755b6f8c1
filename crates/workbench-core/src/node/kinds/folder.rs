use crate::error::Result;
use crate::node::actions::{self, Capabilities};
use crate::persist::{FieldReader, FieldWriter, PersistedFields};

/// Grouping node. Only the base attributes are persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderNode {
    /// Expansion state in the view; transient.
    pub expanded: bool,
}

impl FolderNode {
    pub fn capabilities() -> Capabilities {
        Capabilities {
            on_remove: Some(actions::remove_after_confirm),
            on_edit: Some(actions::rename),
            ..Capabilities::default()
        }
    }
}

impl PersistedFields for FolderNode {
    fn write_fields(&self, _fields: &mut FieldWriter) -> Result<()> {
        Ok(())
    }

    fn read_fields(&mut self, _fields: &FieldReader<'_>) -> Result<()> {
        Ok(())
    }
}
