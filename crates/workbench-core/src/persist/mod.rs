//! Persisted form of the forest.

pub mod codec;
pub mod document;
pub mod fields;

pub use codec::{decode, encode, DecodeIssue, DecodeReport};
pub use document::{NodeRecord, TreeDocument, DOCUMENT_VERSION};
pub use fields::{FieldReader, FieldWriter, PersistedFields};
