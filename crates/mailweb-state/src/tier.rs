use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One of the two independent settings trees kept per scope.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    /// Regular settings. This is the tier addressed when nothing else is requested.
    #[default]
    Volatile,
    /// Settings that survive the host's expiry policies across sessions.
    Persistent,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Volatile => write!(f, "volatile"),
            Tier::Persistent => write!(f, "persistent"),
        }
    }
}
