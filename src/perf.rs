//! Wall-clock timing for callers who want it.
//!
//! The pipeline never times itself; wrap the call you care about instead:
//!
//! ```
//! use planet_overlap::perf::ScopedTimer;
//!
//! let timer = ScopedTimer::new("overlap run");
//! // ... run the pipeline ...
//! let elapsed = timer.finish();
//! assert!(elapsed.as_secs() < 60);
//! ```

use std::time::{Duration, Instant};

/// Logs the elapsed time under `label` when finished or dropped.
pub struct ScopedTimer {
    label: String,
    start: Instant,
    reported: bool,
}

impl ScopedTimer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
            reported: false,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Logs now and returns the elapsed time. Dropping afterwards is silent.
    pub fn finish(mut self) -> Duration {
        let elapsed = self.elapsed();
        self.report(elapsed);
        elapsed
    }

    fn report(&mut self, elapsed: Duration) {
        if !self.reported {
            self.reported = true;
            log::info!("{} took {:.3}s", self.label, elapsed.as_secs_f64());
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        self.report(elapsed);
    }
}

/// Runs `f` inside a [`ScopedTimer`].
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let _timer = ScopedTimer::new(label);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_passes_result_through() {
        assert_eq!(timed("answer", || 6 * 7), 42);
    }

    #[test]
    fn test_finish_reports_elapsed() {
        let timer = ScopedTimer::new("sleep");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.finish() >= Duration::from_millis(5));
    }
}
