//! StartupGate: one-shot signal from the capture thread to `start()`.
//!
//! The gate starts *pending* and is *released* exactly once, after the
//! capture thread has attempted to install the hook, whatever the outcome.
//! The capture thread holds a [`ReleaseOnDrop`] guard across installation so
//! an early return or a panic still releases the waiter; otherwise `start()`
//! would block forever.

use std::sync::{Condvar, Mutex, PoisonError};

use crate::error::KeyHookError;

/// A single-fire broadcast gate (`Mutex<bool>` + `Condvar`).
#[derive(Debug, Default)]
pub struct StartupGate {
    released: Mutex<bool>,
    signal: Condvar,
}

impl StartupGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every current and future waiter.  Later calls have no effect.
    pub fn release(&self) {
        let mut released = self.released.lock().unwrap_or_else(PoisonError::into_inner);
        if !*released {
            *released = true;
            self.signal.notify_all();
        }
    }

    pub fn is_released(&self) -> bool {
        *self.released.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks until the gate is released.  There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`KeyHookError::StartupInterrupted`] if the gate's lock was
    /// poisoned, i.e. a thread panicked while holding it and the outcome of
    /// startup can no longer be trusted.
    pub fn wait(&self) -> Result<(), KeyHookError> {
        let released = self
            .released
            .lock()
            .map_err(|_| KeyHookError::StartupInterrupted)?;
        let _released = self
            .signal
            .wait_while(released, |released| !*released)
            .map_err(|_| KeyHookError::StartupInterrupted)?;
        Ok(())
    }

    /// Poisons the gate's lock, as a thread panicking while holding it would.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = self.released.lock();
            panic!("poisoning startup gate");
        }));
    }

    /// Returns a guard that releases the gate when dropped.
    pub fn release_on_drop(&self) -> ReleaseOnDrop<'_> {
        ReleaseOnDrop { gate: self }
    }
}

/// Releases its [`StartupGate`] on drop, including during unwinding.
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct ReleaseOnDrop<'a> {
    gate: &'a StartupGate,
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
