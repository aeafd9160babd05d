use std::sync::Mutex;

use mailweb_state::StoreId;
use mailweb_store::{RoutingCleanup, StoreError, StoreHandle, StoreLookup};

/// A [`StoreLookup`] over a fixed set of known stores.
#[derive(Debug)]
pub struct MemoryStoreLookup {
    default_store: StoreHandle,
    known: Vec<StoreId>,
    opened: Mutex<Vec<StoreId>>,
    default_unavailable: bool,
}

impl MemoryStoreLookup {
    /// A lookup whose default store has entry id `00`.
    pub fn new() -> Self {
        Self {
            default_store: StoreHandle::default_store(StoreId::new(vec![0x00])),
            known: Vec::new(),
            opened: Mutex::new(Vec::new()),
            default_unavailable: false,
        }
    }

    /// Register a store that can be opened.
    pub fn with_store(mut self, entry_id: StoreId) -> Self {
        self.known.push(entry_id);
        self
    }

    /// Make [`StoreLookup::default_store`] fail.
    pub fn without_default_store(mut self) -> Self {
        self.default_unavailable = true;
        self
    }

    /// Entry ids passed to `open_store`, in order.
    pub fn opened(&self) -> Vec<StoreId> {
        self.opened
            .lock()
            .expect("Mutex should not be poisoned")
            .clone()
    }
}

impl Default for MemoryStoreLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl StoreLookup for MemoryStoreLookup {
    async fn open_store(&self, entry_id: &StoreId) -> Result<StoreHandle, StoreError> {
        self.opened
            .lock()
            .expect("Mutex should not be poisoned")
            .push(entry_id.clone());

        if self.known.contains(entry_id) {
            Ok(StoreHandle::new(entry_id.clone()))
        } else {
            Err(StoreError::NotFound(entry_id.clone()))
        }
    }

    async fn default_store(&self) -> Result<StoreHandle, StoreError> {
        if self.default_unavailable {
            return Err(StoreError::NoDefaultStore);
        }
        Ok(self.default_store.clone())
    }
}

/// A [`RoutingCleanup`] that records the stores it was invoked for.
#[derive(Debug, Default)]
pub struct RecordingRoutingCleanup {
    calls: Mutex<Vec<StoreHandle>>,
    failing: bool,
}

impl RecordingRoutingCleanup {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cleanup hook that always fails (after recording the call).
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Stores the hook was invoked for, in order.
    pub fn calls(&self) -> Vec<StoreHandle> {
        self.calls
            .lock()
            .expect("Mutex should not be poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl RoutingCleanup for RecordingRoutingCleanup {
    async fn clear_routing_properties(&self, store: &StoreHandle) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("Mutex should not be poisoned")
            .push(store.clone());

        if self.failing {
            return Err(StoreError::Backend(format!(
                "Cannot update inbox of store {}",
                store.entry_id()
            )));
        }
        Ok(())
    }
}
