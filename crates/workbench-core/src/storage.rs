//! Key-value storage abstraction used for persisted tree state.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Extension-scoped key-value store.
///
/// Implementations live in `workbench-infrastructure`. Callers treat every
/// error as recoverable; `TreeState` logs and swallows them.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns the stored value, `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}
