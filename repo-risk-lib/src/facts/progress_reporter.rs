//! Terminal progress reporting for long-running analyses.

use super::Progress;
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;

const BAR_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";

/// Shared state for delayed progress reporting.
#[derive(Debug)]
struct DelayedProgressState {
    start_time: Instant,
    delay: Duration,
    visible: AtomicBool,
    has_content: AtomicBool,
}

/// A progress reporter that delays showing the progress bar until a threshold is reached.
///
/// This prevents brief flashes of progress bars for analyses that complete quickly.
/// The progress bar is only shown if the run takes longer than the delay threshold
/// AND has meaningful content (length or message set).
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<DelayedProgressState>,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let bar = ProgressBar::hidden();
        if let Ok(style) = ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_length(0);
        bar.set_draw_target(ProgressDrawTarget::hidden());

        Self {
            bar,
            state: Arc::new(DelayedProgressState {
                start_time: Instant::now(),
                delay,
                visible: AtomicBool::new(false),
                has_content: AtomicBool::new(false),
            }),
        }
    }

    /// Check if enough time has elapsed and we have content, then make the progress bar visible if needed.
    fn ensure_visible(&self) {
        if !self.state.visible.load(Ordering::Relaxed)
            && self.state.has_content.load(Ordering::Relaxed)
            && self.state.start_time.elapsed() >= self.state.delay
        {
            self.state.visible.store(true, Ordering::Relaxed);
            self.bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }
    }
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        // Prefix changes don't affect visibility
        self.bar.set_prefix(phase.to_string());
    }

    fn set_counts(&self, completed: u64, total: u64, message: String) {
        if total > 0 {
            self.state.has_content.store(true, Ordering::Relaxed);
        }
        self.ensure_visible();

        // Always forward to the inner bar so it has correct state when it becomes visible
        self.bar.set_length(total);
        self.bar.set_position(completed);
        self.bar.set_message(message);
    }

    fn finish(&self) {
        if self.state.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}
