//! Lifecycle status and the state shared between a controller and its
//! capture thread.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use super::registry::ListenerRegistry;
use super::startup::StartupGate;

/// Lifecycle of a [`KeyHook`](crate::KeyHook).  `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HookStatus {
    Created = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
    Stopped = 4,
}

impl HookStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => HookStatus::Created,
            1 => HookStatus::Starting,
            2 => HookStatus::Running,
            3 => HookStatus::Stopping,
            _ => HookStatus::Stopped,
        }
    }
}

/// [`HookStatus`] stored in an `AtomicU8`.
#[derive(Debug)]
pub(crate) struct AtomicStatus(AtomicU8);

impl AtomicStatus {
    pub(crate) fn new(status: HookStatus) -> Self {
        Self(AtomicU8::new(status as u8))
    }

    pub(crate) fn load(&self) -> HookStatus {
        HookStatus::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn store(&self, status: HookStatus) {
        self.0.store(status as u8, Ordering::SeqCst);
    }

    /// Moves from `from` to `to`; returns `false` if the status was not `from`.
    pub(crate) fn transition(&self, from: HookStatus, to: HookStatus) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Everything the controller and its capture thread both touch.
#[derive(Debug)]
pub(crate) struct HookShared {
    pub(crate) status: AtomicStatus,
    /// Native id of the capture thread.  Set once, on successful install;
    /// its presence is the "ready" flag.
    pub(crate) thread_id: OnceLock<u32>,
    pub(crate) gate: StartupGate,
    pub(crate) listeners: ListenerRegistry,
}

impl HookShared {
    pub(crate) fn new() -> Self {
        Self {
            status: AtomicStatus::new(HookStatus::Created),
            thread_id: OnceLock::new(),
            gate: StartupGate::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.thread_id.get().is_some()
    }
}
