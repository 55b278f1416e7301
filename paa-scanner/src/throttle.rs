use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Delay honored before every upstream request.
///
/// Each caller reserves a slot one `delay` after the later of now and the
/// previous reservation, so concurrent explorations that share one throttle
/// still go out one `delay` apart.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_slot: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until this caller may issue a request.
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }

        let slot = {
            let mut last_slot = self.last_slot.lock().await;
            let now = Instant::now();
            let earliest = match *last_slot {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            let slot = earliest + self.delay;
            *last_slot = Some(slot);
            slot
        };

        sleep_until(slot).await;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
