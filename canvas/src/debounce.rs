//! Cancelable delayed delivery on a caller-supplied clock.
//!
//! The debouncer never reads a wall clock. Every call passes `now_ms`, which
//! in the browser is `performance.now()` and in tests is whatever the test
//! says. At most one payload is pending: scheduling again replaces it and
//! restarts the delay.

#[cfg(test)]
#[path = "debounce_test.rs"]
mod debounce_test;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: f64,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline_ms: f64,
    payload: T,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, pending: None }
    }

    /// Arm (or re-arm) the timer with `payload`, cancelling any pending one.
    pub fn schedule(&mut self, now_ms: f64, payload: T) {
        self.pending = Some(Pending { deadline_ms: now_ms + self.delay_ms, payload });
    }

    /// Drop the pending payload without delivering it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now_ms >= p.deadline_ms);
        if due { self.pending.take().map(|p| p.payload) } else { None }
    }

    /// When the pending payload becomes due, for hosts that arm a real timer.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
