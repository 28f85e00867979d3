//! Error type for the hook controller.

use thiserror::Error;

/// Errors surfaced by [`KeyHook`](crate::KeyHook).
///
/// Listener panics are deliberately absent: they are caught and logged at the
/// dispatch boundary and never reach the caller.
#[derive(Debug, Error)]
pub enum KeyHookError {
    /// The OS refused to install the low-level keyboard hook.
    #[error("could not install windows key hook")]
    InstallationFailed,

    /// The startup wait was abandoned before the capture thread reported back.
    #[error("capture thread interrupted on startup")]
    StartupInterrupted,

    /// `try_add_listener` was given no listener.
    #[error("listener must not be absent")]
    MissingListener,

    /// `start` was called on a controller that has already been started.
    #[error("key hook has already been started; create a new instance to restart")]
    AlreadyStarted,

    /// The capture thread could not be spawned.
    #[error("failed to spawn capture thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The capture thread terminated by panicking.
    #[error("capture thread panicked")]
    ThreadPanicked,
}
