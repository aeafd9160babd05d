#![doc = include_str!("../README.md")]

mod error;
mod handle;
mod resolver;
mod traits;

pub use error::StoreError;
pub use handle::StoreHandle;
pub use resolver::{is_hex_token, ResolvedScope, StoreScopeResolver};
pub use traits::{RoutingCleanup, StoreLookup};
