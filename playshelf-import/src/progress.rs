//! Reconciliation progress reporting.

use crate::reconcile::{ReconcileError, ReconcileOutcome};

/// Trait for receiving batch reconciliation progress updates.
pub trait ReconcileProgress {
    /// Called after each external id is processed.
    fn on_item(
        &self,
        current: usize,
        total: usize,
        external_id: i64,
        result: &Result<ReconcileOutcome, ReconcileError>,
    );

    /// Called when a phase starts (e.g., "Reconciling 12 external id(s)").
    fn on_phase(&self, message: &str);

    /// Called when the batch is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ReconcileProgress for SilentProgress {
    fn on_item(
        &self,
        _current: usize,
        _total: usize,
        _external_id: i64,
        _result: &Result<ReconcileOutcome, ReconcileError>,
    ) {
    }
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ReconcileProgress for LogProgress {
    fn on_item(
        &self,
        current: usize,
        total: usize,
        external_id: i64,
        result: &Result<ReconcileOutcome, ReconcileError>,
    ) {
        if current.is_multiple_of(100) || current == total {
            let label = match result {
                Ok(outcome) => outcome.label(),
                Err(_) => "failed",
            };
            log::info!("  [{}/{}] {} {}", current, total, external_id, label);
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
