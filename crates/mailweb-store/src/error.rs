use mailweb_error::{kind, ErrorKind};
use mailweb_state::StoreId;
use thiserror::Error;

/// Errors reported by the host's store collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No store exists for the entry id, or the user may not open it.
    #[error("Store {0} could not be opened")]
    NotFound(StoreId),

    /// The default store of the session is not available.
    #[error("Default store is not available")]
    NoDefaultStore,

    /// Any other failure of the store API.
    #[error("Store API error: {0}")]
    Backend(String),
}

impl ErrorKind for StoreError {
    fn error_kind(&self) -> &'static str {
        kind::STORE
    }
}
