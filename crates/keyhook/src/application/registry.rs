//! ListenerRegistry: the set of callbacks that receive key events.
//!
//! Listeners are added from any thread at any time and iterated by the
//! capture thread for every qualifying hook callback.
//!
//! # Copy-on-write storage
//!
//! The registry holds an `Arc<Vec<Listener>>` behind an `RwLock`.  Adding a
//! listener clones the vector, appends, and swaps the new `Arc` in.  Dispatch
//! takes the read lock only long enough to clone the current `Arc`, then
//! iterates that snapshot with no lock held.  A listener that runs slowly (or
//! that itself adds a listener) therefore never blocks writers, and a
//! concurrent add never disturbs an in-flight dispatch: the new listener simply
//! joins from the next event on.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use keyhook_core::KeyEvent;
use tracing::warn;

use crate::error::KeyHookError;

/// A key event callback.  Runs on the capture thread and must return quickly.
pub type Listener = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Summary of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that returned normally.
    pub delivered: usize,
    /// Listeners that panicked (caught and logged).
    pub panicked: usize,
}

/// Thread-safe, append-only listener collection.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Arc<RwLock<Arc<Vec<Listener>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener.  Safe to call concurrently with [`dispatch`](Self::dispatch).
    pub fn add(&self, listener: Listener) {
        let mut guard = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = Vec::with_capacity(guard.len() + 1);
        next.extend(guard.iter().cloned());
        next.push(listener);
        *guard = Arc::new(next);
    }

    /// Appends a listener, rejecting an absent one.
    ///
    /// # Errors
    ///
    /// Returns [`KeyHookError::MissingListener`] when `listener` is `None`.
    pub fn try_add(&self, listener: Option<Listener>) -> Result<(), KeyHookError> {
        let listener = listener.ok_or(KeyHookError::MissingListener)?;
        self.add(listener);
        Ok(())
    }

    /// The listeners registered at this instant, in registration order.
    pub fn snapshot(&self) -> Arc<Vec<Listener>> {
        let guard = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every listener of the current snapshot with `event`, in order.
    ///
    /// A panicking listener is logged and skipped; the remaining listeners
    /// still run.
    pub fn dispatch(&self, event: &KeyEvent) -> DispatchReport {
        let snapshot = self.snapshot();
        let mut report = DispatchReport::default();

        for (index, listener) in snapshot.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.panicked += 1;
                    warn!(
                        listener = index,
                        %event,
                        "key event listener panicked: {}",
                        panic_message(payload.as_ref())
                    );
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}
