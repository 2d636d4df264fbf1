//! Fire-and-forget error reporting.
//!
//! Per-frame problems during a drain are reported, not propagated, so one
//! bad frame never takes the rest of the sequence down with it.

use tracing::error;

/// Receives non-fatal errors from the drain.
///
/// Implementations must never fail and should return quickly; reporting
/// happens on the producer and consumer hot paths.
pub trait ErrorReporter: Send + Sync {
    /// Record `error`, with a short description of what was being done.
    fn report(&self, error: &anyhow::Error, context: &str);
}

/// Reporter that forwards to the `tracing` error log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, error: &anyhow::Error, context: &str) {
        error!("{context}: {error:#}");
    }
}
