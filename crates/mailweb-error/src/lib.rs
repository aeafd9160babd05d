#![doc = include_str!("../README.md")]

mod report;

pub use report::ErrorReport;

/// Stable kind names reported to clients.
pub mod kind {
    /// A setting path was empty or had no segments.
    pub const INVALID_PATH: &str = "InvalidPathError";
    /// The batch contained an action type that is not handled.
    pub const UNKNOWN_ACTION: &str = "UnknownAction";
    /// Loading or saving a settings tier through the durable backend failed.
    pub const PERSISTENCE: &str = "PersistenceError";
    /// Generic settings failure, such as a value of the wrong shape.
    pub const SETTINGS_DOMAIN: &str = "SettingsDomainError";
    /// A mail store collaborator failed.
    pub const STORE: &str = "StoreError";
}

/// Classifies an error into one of the flat kind names in [`kind`].
///
/// Unlike `std::error::Error`, which describes *what* went wrong, the kind describes which bucket
/// the failure belongs to from the client's point of view.
pub trait ErrorKind {
    /// The kind name of this error. Should be one of the constants in [`kind`].
    fn error_kind(&self) -> &'static str;
}

impl<T: ErrorKind + ?Sized> ErrorKind for &T {
    fn error_kind(&self) -> &'static str {
        (**self).error_kind()
    }
}

impl<T: ErrorKind + ?Sized> ErrorKind for Box<T> {
    fn error_kind(&self) -> &'static str {
        (**self).error_kind()
    }
}
