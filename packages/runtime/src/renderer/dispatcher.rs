//! Dispatcher
//!
//! The single logical execution context of one render call: a
//! current-thread runtime driving a `LocalSet`. Every lifecycle step of the
//! call runs here, one at a time. Dropping the dispatcher shuts it down.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;

static ACTIVE_DISPATCHERS: AtomicUsize = AtomicUsize::new(0);

/// Number of dispatchers currently alive in the process.
pub fn active_dispatchers() -> usize {
    ACTIVE_DISPATCHERS.load(Ordering::SeqCst)
}

pub(crate) struct Dispatcher {
    // Dropped before the runtime that drives it.
    local: LocalSet,
    runtime: Runtime,
}

impl Dispatcher {
    pub(crate) fn new() -> io::Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        ACTIVE_DISPATCHERS.fetch_add(1, Ordering::SeqCst);
        Ok(Dispatcher {
            local: LocalSet::new(),
            runtime,
        })
    }

    /// Run `future` to completion on this dispatcher. The calling thread
    /// must not be inside another async runtime.
    pub(crate) fn invoke<F: Future>(&self, future: F) -> F::Output {
        self.local.block_on(&self.runtime, future)
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        ACTIVE_DISPATCHERS.fetch_sub(1, Ordering::SeqCst);
    }
}
