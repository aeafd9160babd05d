use mailweb_error::{kind, ErrorKind};
use thiserror::Error;

use crate::{BackendError, InvalidPathError, Scope, Tier};

/// Errors that can occur when reading, mutating or committing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The requested path could not be parsed.
    #[error(transparent)]
    InvalidPath(#[from] InvalidPathError),

    /// A write tried to descend through a node that holds a non-object value.
    #[error("Setting '{path}' holds a value that cannot contain child settings")]
    NotAContainer {
        #[allow(missing_docs)]
        path: String,
    },

    /// The backend returned a tier that is not a JSON object.
    #[error("Stored {tier} settings of the {scope} are not an object")]
    InvalidTreeShape {
        #[allow(missing_docs)]
        scope: Scope,
        #[allow(missing_docs)]
        tier: Tier,
    },

    /// Loading a tier from the backend failed.
    #[error("Failed to load {tier} settings of the {scope}: {source}")]
    Load {
        #[allow(missing_docs)]
        scope: Scope,
        #[allow(missing_docs)]
        tier: Tier,
        #[allow(missing_docs)]
        source: BackendError,
    },

    /// Committing a tier to the backend failed.
    #[error("Failed to save {tier} settings of the {scope}: {source}")]
    Persistence {
        #[allow(missing_docs)]
        scope: Scope,
        #[allow(missing_docs)]
        tier: Tier,
        #[allow(missing_docs)]
        source: BackendError,
    },
}

impl ErrorKind for SettingsError {
    fn error_kind(&self) -> &'static str {
        match self {
            SettingsError::InvalidPath(e) => e.error_kind(),
            SettingsError::NotAContainer { .. } | SettingsError::InvalidTreeShape { .. } => {
                kind::SETTINGS_DOMAIN
            }
            SettingsError::Load { .. } | SettingsError::Persistence { .. } => kind::PERSISTENCE,
        }
    }
}
