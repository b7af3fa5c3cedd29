use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(feature = "signal")]
use anyhow::{anyhow, Result};
use tracing::{debug, info};

/// A cancellation token bound to the lifetime of a view.
///
/// Every asynchronous operation started by a view checks its signal before
/// touching view state; once the view is closed, late results are dropped.
#[derive(Clone, Debug, Default)]
pub struct ViewSignal {
    is_cancelled: Arc<AtomicBool>,
}

impl ViewSignal {
    #[cfg(feature = "signal")]
    pub fn trap_on_sigint(&self) -> Result<()> {
        let signal = self.clone();
        ::ctrlc::set_handler(move || {
            info!("Gracefully shutting down...");
            signal.cancel()
        })
        .map_err(|error| anyhow!("failed to set SIGINT handler: {error}"))
    }

    pub fn cancel(&self) {
        debug!("view closed; pending results will be dropped");
        self.is_cancelled.store(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Some(value)` while the view is alive.
    pub fn keep<T>(&self, value: T) -> Option<T> {
        if self.is_cancelled() {
            info!("dropping a result that arrived after its view was closed");
            None
        } else {
            Some(value)
        }
    }
}
