//! Minimum-delay pacing for rating-service calls.
//!
//! One [`Pacer`] is shared by every network call of a run, so the delay is a
//! global budget rather than a per-endpoint one. The lock is held across the
//! wait, which serializes callers.

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Enforces at least `min_interval` between consecutive calls.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Longest delay a pacer accepts.
    pub const MAX_INTERVAL: Duration = Duration::from_secs(86_400);

    /// Create a pacer. The first call never waits.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Create a pacer from a delay in (fractional) seconds.
    ///
    /// Negative or non-finite values disable pacing. Values above
    /// [`Pacer::MAX_INTERVAL`] are capped.
    pub fn from_secs_f64(secs: f64) -> Self {
        let interval = if secs.is_finite() && secs > 0.0 {
            Duration::from_secs_f64(secs.min(Self::MAX_INTERVAL.as_secs_f64()))
        } else {
            Duration::ZERO
        };
        Self::new(interval)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call is allowed, then claim the slot.
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}
