use mailweb_state::{Scope, StoreId};

/// An opened mail store as returned by a [`StoreLookup`](crate::StoreLookup).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreHandle {
    entry_id: StoreId,
    is_default: bool,
}

impl StoreHandle {
    /// A handle to a store opened by entry id.
    pub fn new(entry_id: StoreId) -> Self {
        Self {
            entry_id,
            is_default: false,
        }
    }

    /// A handle to the session's own store.
    pub fn default_store(entry_id: StoreId) -> Self {
        Self {
            entry_id,
            is_default: true,
        }
    }

    #[allow(missing_docs)]
    pub fn entry_id(&self) -> &StoreId {
        &self.entry_id
    }

    #[allow(missing_docs)]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The settings scope this store's settings live in.
    pub fn scope(&self) -> Scope {
        if self.is_default {
            Scope::Default
        } else {
            Scope::Store(self.entry_id.clone())
        }
    }
}
