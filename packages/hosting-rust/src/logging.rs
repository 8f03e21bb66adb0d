//! Structured execution logging for hosted operations.

use std::any::Any;
use std::time::Duration;

use hostkit_core::behavior::HostBehavior;

/// Host behavior that records operation executions as `tracing` events.
///
/// The behavior itself is inert configuration. A runtime that finds it on a
/// host description calls [`record_execution`](Self::record_execution) and
/// [`record_failure`](Self::record_failure) around each dispatched
/// operation; events carry the `hostkit::execution` target so subscribers
/// can filter them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionLoggingBehavior;

impl ExecutionLoggingBehavior {
    /// Records a completed operation.
    pub fn record_execution(&self, operation: &str, duration: Duration) {
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = duration.as_millis() as u64;
        tracing::info!(
            target: "hostkit::execution",
            operation = operation,
            duration_ms = duration_ms,
            outcome = "ok",
            "operation complete"
        );
    }

    /// Records an operation that failed.
    pub fn record_failure(&self, operation: &str, duration: Duration, error: &str) {
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = duration.as_millis() as u64;
        tracing::warn!(
            target: "hostkit::execution",
            operation = operation,
            duration_ms = duration_ms,
            outcome = "error",
            error = error,
            "operation failed"
        );
    }
}

impl HostBehavior for ExecutionLoggingBehavior {
    fn name(&self) -> &'static str {
        "execution-logging"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
