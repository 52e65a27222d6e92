//! Settle-window debouncing for rapidly changing values.
//!
//! A [`Debouncer`] holds the most recent value recorded into it and only
//! releases it once the value has been stable for the configured delay.
//! Recording a new value before the window elapses restarts the timer; the
//! previous pending value is replaced, never queued.
//!
//! Every operation has a variant taking an explicit [`Instant`] so callers
//! (and tests) control time; the plain variants use [`Instant::now`].

use std::time::{Duration, Instant};

/// Debounces a stream of values behind a fixed settle window.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    /// The settle window.
    delay: Duration,
    /// The latest recorded value and its release deadline.
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given settle window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Get the configured settle window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value, restarting the settle window.
    pub fn record(&mut self, value: T) {
        self.record_at(value, Instant::now());
    }

    /// Record a new value as of `now`, restarting the settle window.
    ///
    /// Any previously pending value is replaced.
    pub fn record_at(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Release the pending value if its window has elapsed.
    pub fn poll(&mut self) -> Option<T> {
        self.poll_at(Instant::now())
    }

    /// Release the pending value if its window has elapsed as of `now`.
    ///
    /// Returns the value at most once: after a successful poll the
    /// debouncer is empty until the next [`record_at`](Self::record_at).
    pub fn poll_at(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Drop any pending value without releasing it.
    ///
    /// After cancelling, no stale update can fire.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Check whether a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The deadline of the pending value, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, d)| *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(600);

    #[test]
    fn test_new_is_empty() {
        let mut d: Debouncer<String> = Debouncer::new(WINDOW);
        assert!(!d.is_pending());
        assert!(d.poll_at(Instant::now()).is_none());
        assert_eq!(d.delay(), WINDOW);
    }

    #[test]
    fn test_does_not_fire_before_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.record_at("a".to_string(), start);

        assert!(d.poll_at(start).is_none());
        assert!(d.poll_at(start + Duration::from_millis(599)).is_none());
        assert!(d.is_pending());
    }

    #[test]
    fn test_fires_once_after_window() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.record_at("a".to_string(), start);

        assert_eq!(d.poll_at(start + WINDOW), Some("a".to_string()));
        // A second poll yields nothing.
        assert!(d.poll_at(start + WINDOW * 2).is_none());
        assert!(!d.is_pending());
    }

    #[test]
    fn test_rapid_records_fire_once_with_final_value() {
        // Simulates rapid keystrokes: s, sh, sho, shoe. Each record lands
        // inside the previous window; only the final text fires.
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);

        let mut now = start;
        for text in ["s", "sh", "sho", "shoe"] {
            d.record_at(text.to_string(), now);
            now += Duration::from_millis(100);
            assert!(d.poll_at(now).is_none());
        }

        let last_record = start + Duration::from_millis(300);
        assert!(d.poll_at(last_record + WINDOW - Duration::from_millis(1)).is_none());
        assert_eq!(d.poll_at(last_record + WINDOW), Some("shoe".to_string()));
        assert!(d.poll_at(last_record + WINDOW * 2).is_none());
    }

    #[test]
    fn test_record_resets_window_rather_than_queueing() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.record_at("first".to_string(), start);

        // Just before the first deadline, a new value arrives.
        let second_at = start + Duration::from_millis(599);
        d.record_at("second".to_string(), second_at);

        // The original deadline passes without firing.
        assert!(d.poll_at(start + WINDOW).is_none());
        // Only the new deadline releases, and only the new value.
        assert_eq!(d.poll_at(second_at + WINDOW), Some("second".to_string()));
    }

    #[test]
    fn test_cancel_suppresses_pending_value() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.record_at("a".to_string(), start);
        d.cancel();

        assert!(!d.is_pending());
        assert!(d.poll_at(start + WINDOW * 10).is_none());
    }

    #[test]
    fn test_deadline_tracks_latest_record() {
        let start = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.record_at(1, start);
        assert_eq!(d.deadline(), Some(start + WINDOW));

        d.record_at(2, start + Duration::from_millis(50));
        assert_eq!(d.deadline(), Some(start + Duration::from_millis(50) + WINDOW));
    }
}
