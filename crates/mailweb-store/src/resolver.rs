use std::sync::Arc;

use mailweb_state::{Scope, StoreId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{StoreError, StoreHandle, StoreLookup};

/// True if `token` is non-empty and consists of hexadecimal digits only.
pub fn is_hex_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Reasons a store token could not be turned into a scope. Never leaves this module; every
/// variant degrades to the default scope.
#[derive(Debug, Error)]
enum StoreResolutionError {
    #[error("token contains non-hexadecimal characters")]
    Malformed,
    #[error("token is not valid hex: {0}")]
    Undecodable(#[from] hex::FromHexError),
    #[error(transparent)]
    Unreachable(#[from] StoreError),
}

/// The outcome of resolving a store token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedScope {
    scope: Scope,
    store: Option<StoreHandle>,
}

impl ResolvedScope {
    /// The default scope, with the default store not opened yet.
    pub fn default_scope() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The store that was opened while resolving, `None` for the default scope.
    pub fn store(&self) -> Option<&StoreHandle> {
        self.store.as_ref()
    }
}

/// Resolves optional store tokens into settings scopes.
pub struct StoreScopeResolver {
    lookup: Arc<dyn StoreLookup>,
}

impl std::fmt::Debug for StoreScopeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreScopeResolver").finish()
    }
}

impl StoreScopeResolver {
    #[allow(missing_docs)]
    pub fn new(lookup: Arc<dyn StoreLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve a store token into a scope.
    ///
    /// An absent token means the default scope. A present token must consist of hexadecimal
    /// digits, decode to an entry id and open through the [`StoreLookup`]; if any of that fails
    /// the default scope is returned instead. This never fails.
    pub async fn resolve(&self, token: Option<&str>) -> ResolvedScope {
        let Some(token) = token else {
            return ResolvedScope::default_scope();
        };

        match self.try_resolve(token).await {
            Ok(resolved) => {
                debug!(scope = %resolved.scope, "Resolved store token");
                resolved
            }
            Err(error) => {
                warn!(%token, %error, "Falling back to default store");
                ResolvedScope::default_scope()
            }
        }
    }

    /// The store backing a resolved scope, opening the default store if needed.
    pub async fn store_for(&self, resolved: &ResolvedScope) -> Result<StoreHandle, StoreError> {
        match &resolved.store {
            Some(store) => Ok(store.clone()),
            None => self.lookup.default_store().await,
        }
    }

    async fn try_resolve(&self, token: &str) -> Result<ResolvedScope, StoreResolutionError> {
        if !is_hex_token(token) {
            return Err(StoreResolutionError::Malformed);
        }

        let entry_id = StoreId::from_hex(token)?;
        let store = self.lookup.open_store(&entry_id).await?;

        Ok(ResolvedScope {
            scope: store.scope(),
            store: Some(store),
        })
    }
}
