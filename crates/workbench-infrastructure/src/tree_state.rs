//! Save/restore coordinator for the node forest.
//!
//! One writer task owns every write to the storage key. `save` hands it a
//! snapshot and returns at once; the writer waits for a quiet period and
//! writes only the newest snapshot. `save_immediate` goes through the same
//! task so writes are never interleaved.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use workbench_core::config::TreeStateConfig;
use workbench_core::error::{Result, WorkbenchError};
use workbench_core::node::NodeTree;
use workbench_core::persist::{self, DecodeIssue, DecodeReport, TreeDocument};
use workbench_core::registry::NodeRegistry;
use workbench_core::storage::KeyValueStorage;

enum WriterCommand {
    /// Debounced write of this snapshot.
    Schedule(Value),
    /// Write this snapshot now, dropping any pending one.
    Flush {
        snapshot: Value,
        done: oneshot::Sender<Result<()>>,
    },
}

impl WriterCommand {
    fn into_snapshot(self) -> Value {
        match self {
            WriterCommand::Schedule(snapshot) => snapshot,
            WriterCommand::Flush { snapshot, .. } => snapshot,
        }
    }
}

/// Persists and restores the whole forest under one storage key.
///
/// Must be created inside a tokio runtime. Persistence failures never reach
/// the caller: they are logged and the user action that triggered them goes
/// on as if nothing happened.
///
/// # Example
///
/// ```ignore
/// let state = TreeState::spawn(Arc::new(JsonFileStorage::new(dir)), &config.tree_state);
/// let mut tree = state.load(&registry).await;
/// tree.insert(Node::folder("S3"), None)?;
/// state.save(&tree);
/// state.shutdown().await;
/// ```
pub struct TreeState {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    sender: mpsc::UnboundedSender<WriterCommand>,
    writer: JoinHandle<()>,
}

impl TreeState {
    /// Starts the writer task.
    pub fn spawn(storage: Arc<dyn KeyValueStorage>, config: &TreeStateConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(
            storage.clone(),
            config.storage_key.clone(),
            config.debounce(),
            receiver,
        ));

        Self {
            storage,
            key: config.storage_key.clone(),
            sender,
            writer,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Schedules a debounced write of the forest as it is now.
    ///
    /// Calls within the debounce window collapse into one write of the last
    /// snapshot.
    pub fn save(&self, tree: &NodeTree) {
        let Some(snapshot) = snapshot(tree) else {
            return;
        };
        if self.sender.send(WriterCommand::Schedule(snapshot)).is_err() {
            tracing::error!("[TreeState] Writer task is gone, save dropped");
        }
    }

    /// Writes the forest now and waits for the write to finish.
    ///
    /// Meant for teardown, where a debounced write would never fire.
    pub async fn save_immediate(&self, tree: &NodeTree) {
        let Some(snapshot) = snapshot(tree) else {
            return;
        };

        let (done, wait) = oneshot::channel();
        let result = match self.sender.send(WriterCommand::Flush { snapshot, done }) {
            Ok(()) => wait
                .await
                .unwrap_or_else(|_| Err(WorkbenchError::internal("writer dropped flush request"))),
            Err(mpsc::error::SendError(command)) => {
                write_snapshot(self.storage.as_ref(), &self.key, command.into_snapshot()).await
            }
        };

        if let Err(e) = result {
            tracing::error!("[TreeState] Immediate save failed: {}", e);
        }
    }

    /// Restores the forest, or an empty one when storage is missing,
    /// unreadable or malformed.
    pub async fn load(&self, registry: &NodeRegistry) -> NodeTree {
        match self.try_load(registry).await {
            Ok(report) => {
                for issue in &report.issues {
                    log_issue(issue);
                }
                tracing::info!(
                    "[TreeState] Loaded {} node(s) in {} root(s)",
                    report.tree.len(),
                    report.tree.roots().len()
                );
                report.tree
            }
            Err(e) => {
                tracing::warn!(
                    "[TreeState] Failed to load '{}', starting with an empty tree: {}",
                    self.key,
                    e
                );
                NodeTree::new()
            }
        }
    }

    /// Like [`load`](Self::load) but reports what went wrong.
    pub async fn try_load(&self, registry: &NodeRegistry) -> Result<DecodeReport> {
        let value = self.storage.get(&self.key).await.map_err(|e| match e {
            WorkbenchError::StorageRead(_) => e,
            other => WorkbenchError::storage_read(other.to_string()),
        })?;

        let Some(value) = value else {
            tracing::debug!("[TreeState] No saved state under '{}'", self.key);
            return Ok(DecodeReport::default());
        };

        let document = TreeDocument::from_value(value)?;
        persist::decode(&document, registry)
    }

    /// Stops the writer after it has written any pending snapshot.
    pub async fn shutdown(self) {
        let Self { sender, writer, .. } = self;
        drop(sender);
        if let Err(e) = writer.await {
            tracing::error!("[TreeState] Writer task failed: {}", e);
        }
    }
}

fn snapshot(tree: &NodeTree) -> Option<Value> {
    match persist::encode(tree).and_then(|document| document.to_value()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("[TreeState] Failed to serialize tree: {}", e);
            None
        }
    }
}

fn log_issue(issue: &DecodeIssue) {
    match issue {
        DecodeIssue::UnknownType { type_tag, dropped } => tracing::warn!(
            "[TreeState] Dropped {} node(s) with unknown type '{}'",
            dropped,
            type_tag
        ),
        DecodeIssue::TooDeep { type_tag, dropped } => tracing::warn!(
            "[TreeState] Dropped {} node(s) nested too deep, starting at a '{}' node",
            dropped,
            type_tag
        ),
        DecodeIssue::ReassignedId {
            type_tag,
            previous,
            assigned,
        } => tracing::warn!(
            "[TreeState] Assigned new id {} to '{}' node (stored id: {:?})",
            assigned,
            type_tag,
            previous
        ),
    }
}

async fn write_snapshot(storage: &dyn KeyValueStorage, key: &str, snapshot: Value) -> Result<()> {
    storage.set(key, snapshot).await.map_err(|e| match e {
        WorkbenchError::StorageWrite(_) => e,
        other => WorkbenchError::storage_write(other.to_string()),
    })
}

async fn run_writer(
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    debounce: Duration,
    mut receiver: mpsc::UnboundedReceiver<WriterCommand>,
) {
    let mut pending: Option<Value> = None;

    loop {
        let command = if pending.is_some() {
            match tokio::time::timeout(debounce, receiver.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    if let Some(snapshot) = pending.take() {
                        write_debounced(storage.as_ref(), &key, snapshot).await;
                    }
                    continue;
                }
            }
        } else {
            receiver.recv().await
        };

        match command {
            Some(WriterCommand::Schedule(snapshot)) => pending = Some(snapshot),
            Some(WriterCommand::Flush { snapshot, done }) => {
                pending = None;
                let result = write_snapshot(storage.as_ref(), &key, snapshot).await;
                // the caller may have stopped waiting
                let _ = done.send(result);
            }
            None => {
                if let Some(snapshot) = pending.take() {
                    write_debounced(storage.as_ref(), &key, snapshot).await;
                }
                break;
            }
        }
    }
}

async fn write_debounced(storage: &dyn KeyValueStorage, key: &str, snapshot: Value) {
    match write_snapshot(storage, key, snapshot).await {
        Ok(()) => tracing::debug!("[TreeState] Saved tree state under '{}'", key),
        Err(e) => tracing::error!("[TreeState] Debounced save failed: {}", e),
    }
}
