//! Progress reporting seam between the engine and whatever hosts it.

use core::fmt::Debug;

/// Receives progress notifications while an analysis runs.
///
/// The engine never draws anything itself; the CLI plugs in a terminal progress bar while
/// library callers and tests use [`NoProgress`].
pub trait Progress: Debug + Send + Sync {
    /// Name the current phase (e.g. "Probing", "Scoring").
    fn set_phase(&self, phase: &str);

    /// Report request completion counts along with a short description.
    fn set_counts(&self, completed: u64, total: u64, message: String);

    /// The analysis is over; tear down any visible indicator.
    fn finish(&self);
}

/// A [`Progress`] implementation that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn set_phase(&self, _phase: &str) {}

    fn set_counts(&self, _completed: u64, _total: u64, _message: String) {}

    fn finish(&self) {}
}
