//! Coalescing update trigger
//!
//! Bursts of `trigger()` calls collapse into a single callback once things have been quiet
//! for `min_wait`, but never later than roughly `max_wait` after the burst started.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tracing::trace;

pub type TriggerCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct TriggerState {
    running: bool,
    rearmed: bool,
}

/// Trailing-edge debounce with a latency ceiling
#[derive(Clone)]
pub struct Trigger {
    name: &'static str,
    min_wait: Duration,
    max_wait: Duration,
    state: Arc<Mutex<TriggerState>>,
    callback: TriggerCallback,
}

impl Trigger {
    pub fn new(
        name: &'static str,
        min_wait: Duration,
        max_wait: Duration,
        callback: TriggerCallback,
    ) -> Self {
        Self {
            name,
            min_wait,
            max_wait,
            state: Arc::new(Mutex::new(TriggerState::default())),
            callback,
        }
    }

    /// Request a callback. Must be called from within a tokio runtime.
    pub fn trigger(&self) {
        {
            let mut state = self.state.lock();
            if state.running {
                state.rearmed = true;
                return;
            }
            state.running = true;
            state.rearmed = false;
        }

        let this = self.clone();
        tokio::spawn(async move { this.run().await });
    }

    /// Whether a coalescing task is currently pending
    pub fn is_pending(&self) -> bool {
        self.state.lock().running
    }

    async fn run(self) {
        let started = Instant::now();
        loop {
            sleep(self.min_wait).await;

            let mut state = self.state.lock();
            if !state.rearmed || started.elapsed() > self.max_wait {
                state.running = false;
                state.rearmed = false;
                break;
            }
            state.rearmed = false;
        }

        trace!(
            "Trigger '{}' fired after {:?}",
            self.name,
            started.elapsed()
        );
        (self.callback)();
    }
}
