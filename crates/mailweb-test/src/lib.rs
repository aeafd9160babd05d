//! In-memory stand-ins for the host collaborators of the settings pipeline.

mod backend;
mod logs;
mod store;

pub use backend::MemorySettingsBackend;
pub use logs::CapturedLogs;
pub use store::{MemoryStoreLookup, RecordingRoutingCleanup};

/// Install a test writer subscriber so `tracing` output shows up in failing tests. Safe to call
/// from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .try_init();
}
