//! Data dependencies scoped to a view's lifetime.
//!
//! A view creates a `ViewActivation` when it becomes active and runs its
//! fetches through a `ViewScope`. Once the activation is dropped or
//! deactivated, pending fetches resolve to `Err(Discarded)` and their
//! responses never reach the torn-down view.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("view was deactivated before the result arrived")]
pub struct Discarded;

struct Inner {
    name: String,
    cancelled: watch::Sender<bool>,
}

/// Owned by the view. Dropping it deactivates the view.
pub struct ViewActivation {
    inner: Arc<Inner>,
}

/// Cloneable handle for running fetches on behalf of an activation.
#[derive(Clone)]
pub struct ViewScope {
    inner: Arc<Inner>,
}

impl ViewActivation {
    pub fn new(name: impl Into<String>) -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                name: name.into(),
                cancelled,
            }),
        }
    }

    pub fn scope(&self) -> ViewScope {
        ViewScope {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Discard everything still in flight.
    pub fn deactivate(&self) {
        if self.inner.cancelled.send_if_modified(|cancelled| !std::mem::replace(cancelled, true)) {
            debug!(view = %self.inner.name, "View deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        !*self.inner.cancelled.borrow()
    }
}

impl Drop for ViewActivation {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl ViewScope {
    pub fn is_active(&self) -> bool {
        !*self.inner.cancelled.borrow()
    }

    /// Drive `fut` unless the view goes away first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Discarded> {
        let mut cancelled = self.inner.cancelled.subscribe();
        if *cancelled.borrow_and_update() {
            return Err(Discarded);
        }

        tokio::select! {
            biased;
            _ = cancelled.wait_for(|cancelled| *cancelled) => {
                debug!(view = %self.inner.name, "Discarding result for inactive view");
                Err(Discarded)
            }
            output = fut => Ok(output),
        }
    }
}
