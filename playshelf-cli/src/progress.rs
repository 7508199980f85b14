//! Terminal progress bar for batch reconciliation.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use playshelf_import::{ReconcileError, ReconcileOutcome, ReconcileProgress};

/// Draws one bar across a reconcile batch. Hidden when `quiet` is set.
pub(crate) struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new(total: usize, quiet: bool) -> Self {
        let pb = ProgressBar::new(total as u64);
        if quiet {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        let style = ProgressStyle::with_template("  {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("/-\\|")
            .progress_chars("=> ");
        pb.set_style(style);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }
}

impl ReconcileProgress for BarProgress {
    fn on_item(
        &self,
        current: usize,
        _total: usize,
        external_id: i64,
        result: &Result<ReconcileOutcome, ReconcileError>,
    ) {
        let label = match result {
            Ok(outcome) => outcome.label(),
            Err(_) => "failed",
        };
        self.pb.set_position(current as u64);
        self.pb.set_message(format!("{} {}", external_id, label));
    }

    fn on_phase(&self, message: &str) {
        self.pb.println(message);
    }

    fn on_complete(&self, _message: &str) {
        self.pb.finish_and_clear();
    }
}
