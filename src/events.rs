//! Schema change notification channel
//!
//! After a successful mutation and metadata resync, the store emits a
//! reload signal so the row-level query layer can refresh its cached view
//! of the schema without a restart. The channel is a plain broadcast; the
//! query layer subscribes and invalidates on receipt.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What happened to a table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Altered,
    Deleted,
}

/// A schema reload signal for one table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaChange {
    /// Table the change applies to
    pub table_name: String,
    /// Kind of structural change
    pub kind: ChangeKind,
}

/// Broadcast sender for schema change events
///
/// Subscribers that lag behind drop old events; the signal only means
/// "reload your schema cache", so losing intermediate events is harmless.
#[derive(Debug, Clone)]
pub struct SchemaNotifier {
    sender: broadcast::Sender<SchemaChange>,
}

impl SchemaNotifier {
    /// Create a notifier with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to schema change events
    pub fn subscribe(&self) -> broadcast::Receiver<SchemaChange> {
        self.sender.subscribe()
    }

    /// Emit a change event; a send with no live subscribers is not an error
    pub fn notify(&self, table_name: &str, kind: ChangeKind) {
        let change = SchemaChange {
            table_name: table_name.to_string(),
            kind,
        };
        if self.sender.send(change).is_err() {
            log::debug!(
                "schema change for '{}' had no subscribers ({:?})",
                table_name,
                kind
            );
        }
    }
}

impl Default for SchemaNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
