//! Periodic tick generation on a background thread.
//!
//! The thread only produces tick numbers; it never touches cycle state. Ticks
//! go through a bounded(1) channel and a tick that finds the previous one
//! still unconsumed is dropped and counted as missed, so a slow consumer never
//! sees a backlog.
//!
//! Each `Ticker` owns exactly one thread, which is shut down and joined when
//! the `Ticker` is dropped.
use crossbeam_channel as xch;
use luxagg_traits::{Clock, TickSource};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Longest uninterrupted sleep; bounds how late a shutdown is noticed.
const SHUTDOWN_POLL: Duration = Duration::from_millis(10);

/// Sleep for `period` in slices of at most `SHUTDOWN_POLL`. Returns `false`
/// if shutdown was requested before the period elapsed.
fn sleep_until_shutdown<C: Clock>(clock: &C, period: Duration, shutdown: &AtomicBool) -> bool {
    let deadline = clock.now() + period;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let now = clock.now();
        if now >= deadline {
            return true;
        }
        clock.sleep((deadline - now).min(SHUTDOWN_POLL));
    }
}

pub struct Ticker {
    rx: xch::Receiver<u64>,
    missed: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

/// Cloneable handle that stops a `Ticker` from another thread (e.g. a signal handler).
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Ticker {
    pub fn spawn<C: Clock + Send + 'static>(period: Duration, clock: C) -> Self {
        let (tx, rx) = xch::bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let missed = Arc::new(AtomicU64::new(0));
        let missed_clone = missed.clone();

        let join_handle = std::thread::spawn(move || {
            let mut tick: u64 = 0;
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("ticker thread received shutdown signal");
                    break;
                }
                if !sleep_until_shutdown(&clock, period, &shutdown_clone) {
                    break;
                }
                tick += 1;
                match tx.try_send(tick) {
                    Ok(()) => {}
                    Err(xch::TrySendError::Full(_)) => {
                        let n = missed_clone.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::warn!(tick, missed = n, "tick missed; consumer still busy");
                    }
                    Err(xch::TrySendError::Disconnected(_)) => {
                        tracing::debug!("ticker consumer disconnected, exiting thread");
                        break;
                    }
                }
            }
            tracing::trace!("ticker thread exiting cleanly");
        });

        Self {
            rx,
            missed,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(self.shutdown.clone())
    }

    /// Ticks dropped because the previous one was still pending.
    pub fn missed(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }
}

impl TickSource for Ticker {
    /// Blocks for the next tick; `None` once the thread has exited and the
    /// channel is drained.
    fn next_tick(&mut self) -> Option<u64> {
        self.rx.recv().ok()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // The thread exits within one SHUTDOWN_POLL slice.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("ticker thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "ticker thread panicked during shutdown");
                }
            }
        }
    }
}

/// Ticks as fast as they are consumed, without end. Used for offline replay.
#[derive(Debug, Default, Clone)]
pub struct ImmediateTicks {
    next: u64,
}

impl ImmediateTicks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for ImmediateTicks {
    fn next_tick(&mut self) -> Option<u64> {
        self.next = self.next.saturating_add(1);
        Some(self.next)
    }
}
