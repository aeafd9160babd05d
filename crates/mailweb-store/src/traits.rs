use mailweb_state::StoreId;

use crate::{StoreError, StoreHandle};

/// Opens mail stores on behalf of the current session.
#[async_trait::async_trait]
pub trait StoreLookup: Send + Sync {
    /// Open the store with the given binary entry id.
    async fn open_store(&self, entry_id: &StoreId) -> Result<StoreHandle, StoreError>;

    /// The session's own store.
    async fn default_store(&self) -> Result<StoreHandle, StoreError>;
}

/// Host hook run by `delete` and `reset` actions before any setting is removed.
#[async_trait::async_trait]
pub trait RoutingCleanup: Send + Sync {
    /// Remove the additional mailbox routing properties from the store's inbox.
    async fn clear_routing_properties(&self, store: &StoreHandle) -> Result<(), StoreError>;
}
