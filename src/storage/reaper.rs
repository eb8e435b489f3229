//! Reaper
//!
//! Background task that periodically removes expired entries.
//! Runs on a dedicated thread by default, or as a task on a tokio runtime.

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Something the reaper can sweep
pub trait Sweep: Send + Sync + 'static {
    /// Remove expired entries, returns how many were removed
    fn sweep(&self) -> usize;
}

enum Driver {
    Thread {
        stop: Option<Sender<()>>,
        handle: Option<JoinHandle<()>>,
    },
    Task {
        stop: Option<oneshot::Sender<()>>,
        handle: Option<tokio::task::JoinHandle<()>>,
    },
}

/// Background sweep task owned by a single cache
pub struct Reaper {
    interval: Duration,
    driver: Mutex<Driver>,
}

impl Reaper {
    /// Spawn the reaper on a dedicated thread
    pub fn spawn(target: Arc<dyn Sweep>, interval: Duration) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("ttlcache-reaper".to_string())
            .spawn(move || {
                let ticker = channel::tick(interval);
                info!("Reaper started, interval: {:?}", interval);

                loop {
                    channel::select! {
                        recv(ticker) -> _ => run_sweep(target.as_ref()),
                        // A send or a dropped sender both stop the loop
                        recv(stop_rx) -> _ => break,
                    }
                }

                debug!("Reaper stopped");
            })?;

        Ok(Self {
            interval,
            driver: Mutex::new(Driver::Thread {
                stop: Some(stop_tx),
                handle: Some(handle),
            }),
        })
    }

    /// Spawn the reaper as a task on a tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if the runtime was built without its time driver
    /// (`enable_time`). The ticker is created here, not inside the task,
    /// so that happens at construction instead of on a worker thread.
    pub fn spawn_on(handle: &Handle, target: Arc<dyn Sweep>, interval: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let mut ticker = {
            let _guard = handle.enter();
            tokio::time::interval(interval)
        };
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let task = handle.spawn(async move {
            // First tick completes immediately
            ticker.tick().await;
            info!("Reaper task started, interval: {:?}", interval);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => run_sweep(target.as_ref()),
                }
            }

            debug!("Reaper task stopped");
        });

        Self {
            interval,
            driver: Mutex::new(Driver::Task {
                stop: Some(stop_tx),
                handle: Some(task),
            }),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the loop is alive: not stopped and not exited on its own
    /// (a panicking sweep, or a runtime that was shut down)
    pub fn is_running(&self) -> bool {
        match &*self.driver.lock() {
            Driver::Thread { stop, handle } => {
                stop.is_some() && handle.as_ref().is_some_and(|h| !h.is_finished())
            }
            Driver::Task { stop, handle } => {
                stop.is_some() && handle.as_ref().is_some_and(|h| !h.is_finished())
            }
        }
    }

    /// Stop the reaper. Safe to call more than once.
    ///
    /// The thread driver is joined, so a sweep in progress finishes before
    /// this returns. The task driver is only signalled: a sweep already
    /// running on the runtime completes after this returns, and the task
    /// checks the signal before every later tick, so no new sweep starts.
    pub fn stop(&self) {
        let joinable = {
            let mut driver = self.driver.lock();
            match &mut *driver {
                Driver::Thread { stop, handle } => {
                    if let Some(tx) = stop.take() {
                        let _ = tx.try_send(());
                    }
                    handle.take()
                }
                Driver::Task { stop, handle } => {
                    if let Some(tx) = stop.take() {
                        let _ = tx.send(());
                    }
                    // Dropping the handle detaches the task; it still sees the signal
                    handle.take();
                    None
                }
            }
        };

        if let Some(handle) = joinable {
            // The reaper thread never owns a Reaper, so this can't self-join
            if handle.join().is_err() {
                warn!("Reaper thread panicked");
            }
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Reaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reaper")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

fn run_sweep(target: &dyn Sweep) {
    let removed = target.sweep();
    if removed > 0 {
        debug!(removed = removed, "Swept expired entries");
    }
}
