//! Wall-clock throttling for progress events.
//!
//! Long phases count processed items on every step but only report
//! when the interval has elapsed since the last report. Safe to share
//! between rayon workers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default interval between progress reports
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Counts processed items and signals when a progress report is due
pub struct ProgressTicker {
    interval: Duration,
    last_report: Mutex<Instant>,
    counter: AtomicUsize,
}

impl ProgressTicker {
    /// Create a ticker that reports at most once per `interval`
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_report: Mutex::new(Instant::now()),
            counter: AtomicUsize::new(0),
        }
    }

    /// Record one processed item.
    ///
    /// Returns the running count when a report is due.
    pub fn tick(&self) -> Option<usize> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        let mut last = self.last_report.lock().ok()?;
        if last.elapsed() >= self.interval {
            *last = Instant::now();
            Some(count)
        } else {
            None
        }
    }

    /// Number of items recorded so far
    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRESS_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_reports_every_tick() {
        let ticker = ProgressTicker::new(Duration::ZERO);
        assert_eq!(ticker.tick(), Some(1));
        assert_eq!(ticker.tick(), Some(2));
    }

    #[test]
    fn long_interval_stays_quiet_but_counts() {
        let ticker = ProgressTicker::new(Duration::from_secs(3600));
        assert_eq!(ticker.tick(), None);
        assert_eq!(ticker.tick(), None);
        assert_eq!(ticker.count(), 2);
    }
}
