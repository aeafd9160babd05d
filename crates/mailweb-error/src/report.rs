use std::fmt::Display;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ErrorKind;

/// A classified failure as it is sent back to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorReport {
    /// One of the kind names in [`crate::kind`].
    pub kind: String,
    /// Human readable description of the failure.
    pub message: String,
}

impl ErrorReport {
    #[allow(missing_docs)]
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Build a report from any classified error, using its `Display` output as the message.
    pub fn from_error<E: ErrorKind + Display + ?Sized>(error: &E) -> Self {
        Self::new(error.error_kind(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind;

    struct Unreachable;

    impl Display for Unreachable {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "store is unreachable")
        }
    }

    impl ErrorKind for Unreachable {
        fn error_kind(&self) -> &'static str {
            kind::STORE
        }
    }

    #[test]
    fn report_uses_kind_and_display() {
        let report = ErrorReport::from_error(&Unreachable);

        assert_eq!(report, ErrorReport::new("StoreError", "store is unreachable"));
    }

    #[test]
    fn report_serializes_as_kind_and_message() {
        let report = ErrorReport::new(kind::UNKNOWN_ACTION, "Unknown action type 'frobnicate'");

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "kind": "UnknownAction",
                "message": "Unknown action type 'frobnicate'",
            })
        );
    }
}
