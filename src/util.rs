//! Timing helpers for pipeline diagnostics.

use std::time::Instant;

/// RAII guard that logs a phase's elapsed time at debug level on drop.
///
/// # Example
/// ```ignore
/// let _t = PhaseTimer::start("neighbor lists");
/// // ... build ...
/// // logs "neighbor lists: 12.3ms" when _t drops
/// ```
pub(crate) struct PhaseTimer {
    name: &'static str,
    start: Instant,
}

impl PhaseTimer {
    pub fn start(name: &'static str) -> Self {
        log::trace!("{}...", name);
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        log::debug!("{}: {:.3?}", self.name, self.start.elapsed());
    }
}
