use serde_json::Value;
use thiserror::Error;

use crate::{Scope, Tier};

/// An error reported by a [`SettingsBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// An internal unspecified error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Durable storage for settings trees, provided by the host.
///
/// Each scope has two independently stored trees, one per [`Tier`]. Trees are exchanged in their
/// JSON object form.
#[async_trait::async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Load the stored tree, `None` if nothing has been stored yet.
    async fn load(&self, scope: &Scope, tier: Tier) -> Result<Option<Value>, BackendError>;

    /// Replace the stored tree.
    async fn save(&self, scope: &Scope, tier: Tier, tree: &Value) -> Result<(), BackendError>;
}
