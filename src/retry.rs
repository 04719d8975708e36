// ABOUTME: Retry scheduling for the impact-slides application
// ABOUTME: A cancellable countdown task that emits one tick per interval

use crate::state::Event;
use log::debug;
use parking_lot::{Condvar, Mutex};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shared cancellation flag that sleeping tasks can be woken from.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, signal) = &*self.inner;
        *flag.lock() = true;
        signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Re-arm the token for a new generation cycle.
    pub fn reset(&self) {
        *self.inner.0.lock() = false;
    }

    /// Sleep for `timeout` unless cancelled first. Returns true when cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, signal) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock();
        while !*cancelled {
            if signal.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

/// Countdown running on its own thread, delivering [`Event::Tick`]s.
///
/// `spawn` on its own does not stop older countdowns; go through a
/// [`CountdownSlot`] to keep a single timer active.
pub struct RetryCountdown {
    events: Receiver<Event>,
    stop: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RetryCountdown {
    /// Start emitting `ticks` ticks, one per `interval`.
    ///
    /// The task stops early when either `token` or the countdown's own
    /// stop token is cancelled.
    pub fn spawn(ticks: u32, interval: Duration, token: CancellationToken) -> Self {
        let (tx, events) = mpsc::channel();
        let stop = CancellationToken::new();
        let task_stop = stop.clone();

        let handle = thread::spawn(move || {
            for remaining in (0..ticks).rev() {
                if token.wait_timeout(interval) || task_stop.is_cancelled() {
                    debug!("Retry countdown cancelled with {} ticks left", remaining + 1);
                    return;
                }
                if tx.send(Event::Tick).is_err() {
                    // Nobody is listening any more
                    return;
                }
            }
        });

        Self {
            events,
            stop,
            handle: Some(handle),
        }
    }

    /// Blocking iterator over the ticks; ends when the task finishes.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.events.iter()
    }

    /// Stop this countdown without touching the session's token.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn join(mut self) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remembers the latest countdown so starting another one stops it.
#[derive(Debug, Default)]
pub struct CountdownSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl CountdownSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the previous countdown, if any, and spawn a new one in its place.
    pub fn start(
        &self,
        ticks: u32,
        interval: Duration,
        token: CancellationToken,
    ) -> RetryCountdown {
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            debug!("Superseding the running retry countdown");
            previous.cancel();
        }
        let countdown = RetryCountdown::spawn(ticks, interval, token);
        *current = Some(countdown.stop.clone());
        countdown
    }
}

impl Drop for RetryCountdown {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
