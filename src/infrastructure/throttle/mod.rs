//! Monotonic-clock-gated minimum-interval throttler.
//!
//! Concurrent callers of `wait` are serialized by a mutex so each one sleeps
//! a full interval measured from the previous waiter's exit, not from when
//! it first asked to wait. A zero/negative interval makes every operation a
//! no-op (mirrors the source's `MaybeThrottler`).

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

struct State {
    last_event: Option<Instant>,
}

pub struct Throttler {
    interval: Duration,
    state: Mutex<State>,
}

impl Throttler {
    pub fn new(interval: Duration) -> Self {
        Throttler {
            interval,
            state: Mutex::new(State { last_event: None }),
        }
    }

    /// A throttler with a non-positive interval: every operation is a no-op.
    pub fn disabled() -> Self {
        Throttler::new(Duration::ZERO)
    }

    fn is_disabled(&self) -> bool {
        self.interval.is_zero()
    }

    pub async fn mark(&self) {
        if self.is_disabled() {
            return;
        }
        let mut state = self.state.lock().await;
        state.last_event = Some(Instant::now());
    }

    pub async fn reset(&self) {
        if self.is_disabled() {
            return;
        }
        let mut state = self.state.lock().await;
        state.last_event = None;
    }

    /// True if unset or if more than the interval has elapsed since the last mark.
    pub async fn check(&self) -> bool {
        if self.is_disabled() {
            return true;
        }
        let state = self.state.lock().await;
        match state.last_event {
            None => true,
            Some(t) => t.elapsed() > self.interval,
        }
    }

    /// Blocks until the interval has elapsed since the last mark, then marks.
    /// Holds the state mutex for the whole wait, so concurrent callers are
    /// serialized and each restarts the full interval from the previous
    /// caller's exit.
    pub async fn wait(&self) {
        if self.is_disabled() {
            return;
        }
        let mut state = self.state.lock().await;
        if let Some(last) = state.last_event {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed).await;
            }
        }
        state.last_event = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant as StdInstant;

    #[tokio::test]
    async fn disabled_throttler_never_waits() {
        let t = Throttler::disabled();
        let start = StdInstant::now();
        t.wait().await;
        t.wait().await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn check_true_when_unset() {
        let t = Throttler::new(Duration::from_secs(1));
        assert!(t.check().await);
    }

    #[tokio::test]
    async fn check_false_immediately_after_mark() {
        let t = Throttler::new(Duration::from_millis(200));
        t.mark().await;
        assert!(!t.check().await);
    }

    #[tokio::test]
    async fn concurrent_waiters_serialize_and_restart_full_interval() {
        let t = Arc::new(Throttler::new(Duration::from_millis(100)));
        t.mark().await;

        let start = StdInstant::now();
        let mut handles = Vec::new();
        for _ in 0..3 {
            let t = t.clone();
            handles.push(tokio::spawn(async move {
                t.wait().await;
                start.elapsed()
            }));
        }

        let mut elapsed: Vec<Duration> = Vec::new();
        for h in handles {
            elapsed.push(h.await.unwrap());
        }
        elapsed.sort();

        assert!(elapsed[0] >= Duration::from_millis(90));
        assert!(elapsed[1] >= Duration::from_millis(190));
        assert!(elapsed[2] >= Duration::from_millis(290));
    }
}
