// src/fetch/throttle.rs

use std::time::Duration;
use tokio::{
    sync::Mutex,
    time::{sleep_until, Instant},
};
use tracing::trace;

/// Minimum-interval policy between successive requests.
pub struct Throttle {
    min_interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous grant.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                let delay = ready_at.saturating_duration_since(Instant::now());
                trace!(delay_ms = delay.as_millis() as u64, "throttling");
                sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
