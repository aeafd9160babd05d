#![doc = include_str!("../README.md")]

mod backend;
mod error;
mod path;
mod registry;
mod scope;
mod tier;
mod tiered;
mod tree;

pub use backend::{BackendError, SettingsBackend};
pub use error::SettingsError;
pub use path::{InvalidPathError, SettingPath, DEFAULT_SEPARATOR};
pub use registry::{ScopedSettings, SettingsRegistry};
pub use scope::{Scope, StoreId};
pub use tier::Tier;
pub use tiered::{MergePrecedence, TieredSettings};
pub use tree::SettingsTree;
