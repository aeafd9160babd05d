use mailweb_error::{kind, ErrorKind};
use mailweb_state::{InvalidPathError, SettingsError};
use mailweb_store::StoreError;
use thiserror::Error;

/// Failure of a single action. Recorded in the response envelope, never propagated past the
/// batch.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action type is not one of the handled types.
    #[error("Unknown action type '{0}'")]
    UnknownAction(String),

    #[allow(missing_docs)]
    #[error(transparent)]
    InvalidPath(#[from] PathPayloadError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[allow(missing_docs)]
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The action came after the configured maximum number of actions per batch.
    #[error("Batch exceeds the maximum of {limit} actions")]
    BatchLimitExceeded {
        #[allow(missing_docs)]
        limit: usize,
    },
}

/// A `delete`/`reset` path payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathPayloadError {
    #[allow(missing_docs)]
    #[error(transparent)]
    Invalid(#[from] InvalidPathError),

    /// A `setting_path` entry was not a string.
    #[error("Setting path must be a string, got {0}")]
    NotAString(String),
}

impl ErrorKind for ActionError {
    fn error_kind(&self) -> &'static str {
        match self {
            ActionError::UnknownAction(_) => kind::UNKNOWN_ACTION,
            ActionError::InvalidPath(_) => kind::INVALID_PATH,
            ActionError::Settings(e) => e.error_kind(),
            ActionError::Store(e) => e.error_kind(),
            ActionError::BatchLimitExceeded { .. } => kind::SETTINGS_DOMAIN,
        }
    }
}
