use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fixed-interval gate polled by a busy loop.
///
/// The next deadline is measured from the tick that actually ran, so a late
/// tick pushes the schedule back instead of queueing catch-up ticks.
#[derive(Debug, Clone, Copy)]
pub struct DeadlineTimer {
    interval_ms: u64,
    next_deadline_ms: u64,
}

impl DeadlineTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            next_deadline_ms: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn next_deadline_ms(&self) -> u64 {
        self.next_deadline_ms
    }

    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_deadline_ms {
            return false;
        }
        self.next_deadline_ms = now_ms.saturating_add(self.interval_ms);
        true
    }
}

/// Cooperative shutdown flag shared by both loops, checked once per iteration.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_poll_fires_immediately() {
        let mut timer = DeadlineTimer::new(8);
        assert!(timer.poll(0));
        assert_eq!(timer.next_deadline_ms(), 8);
    }

    #[test]
    fn polls_before_deadline_do_nothing() {
        let mut timer = DeadlineTimer::new(8);
        assert!(timer.poll(100));
        assert!(!timer.poll(101));
        assert!(!timer.poll(107));
        assert!(timer.poll(108));
        assert_eq!(timer.next_deadline_ms(), 116);
    }

    #[test]
    fn late_poll_reschedules_from_now() {
        let mut timer = DeadlineTimer::new(8);
        assert!(timer.poll(0));
        assert!(timer.poll(50));
        assert_eq!(timer.next_deadline_ms(), 58);
        assert!(!timer.poll(57));
    }

    #[test]
    fn zero_interval_is_clamped() {
        assert_eq!(DeadlineTimer::new(0).interval_ms(), 1);
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let signal = StopSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_stop_requested());

        signal.request_stop();
        assert!(observer.is_stop_requested());
    }
}
