//! Resend cooldown timer
//!
//! One background task per countdown. Starting again or cancelling aborts the
//! previous task first, and dropping the countdown aborts it too, so a torn
//! down flow never keeps ticking.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Seconds before a new code can be requested.
pub const RESEND_COOLDOWN_SECS: u32 = 60;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Countdown {
    remaining: Arc<AtomicU32>,
    task: Option<JoinHandle<()>>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    /// Countdown ticking once per second.
    pub fn new() -> Self {
        Self {
            remaining: Arc::new(AtomicU32::new(0)),
            task: None,
        }
    }

    /// (Re)start from `seconds`. Must be called inside a tokio runtime.
    pub fn start(&mut self, seconds: u32) {
        self.abort_task();
        self.remaining.store(seconds, Ordering::SeqCst);
        if seconds == 0 {
            return;
        }

        let remaining = Arc::clone(&self.remaining);
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tick(&remaining) == 0 {
                    break;
                }
            }
        }));
    }

    /// Stop ticking and reset to zero.
    pub fn cancel(&mut self) {
        self.abort_task();
        self.remaining.store(0, Ordering::SeqCst);
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// Resend is allowed once the countdown has run out.
    pub fn is_expired(&self) -> bool {
        self.remaining() == 0
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Decrement by one, saturating at zero. Returns the new value.
fn tick(remaining: &AtomicU32) -> u32 {
    let previous = remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
        .unwrap_or(0);
    previous.saturating_sub(1)
}
