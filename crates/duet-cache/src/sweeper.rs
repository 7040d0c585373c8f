//! Owned background thread that runs a periodic task.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

/// Runs `tick` every `interval` until dropped. Dropping closes the stop
/// channel, which wakes the thread immediately, and then joins it.
pub(crate) struct Sweeper {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// `tick` returns `false` to end the loop early.
    pub(crate) fn spawn<F>(name: &str, interval: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(format!("duet-sweep-{name}"))
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !tick() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(cache = name, interval_ms = interval.as_millis() as u64, "sweeper started");
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sweeper thread panicked");
            }
        }
    }
}
