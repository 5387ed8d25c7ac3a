//! Structured logging setup for hosts embedding the engine.

use tracing_subscriber::EnvFilter;

use crate::util::metrics::describe_metrics;

/// Filter used when `RUST_LOG` is unset: engine events at info, operator
/// alerts always.
pub const DEFAULT_LOG_FILTER: &str = "waitroom=info,waitroom::alert=warn";

/// Install a formatted subscriber unless the host already set one.
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Logging plus metric descriptions, for hosts that install a `metrics`
/// recorder before building the room.
pub fn init_telemetry() {
    init_tracing();
    describe_metrics();
}
