//! The operating-system side of the keyboard hook.
//!
//! On Windows this is a `WH_KEYBOARD_LL` hook installed on a dedicated thread
//! that pumps a Win32 message loop.  The hook procedure is invoked by the OS
//! *from inside* `GetMessageW` on that same thread, once per raw keyboard
//! event, system-wide.
//!
//! # Testability
//!
//! The [`HookPlatform`] trait lets the capture thread run unchanged against
//! [`mock::ScriptedHookPlatform`], which replays queued raw events through the
//! installed hook procedure without touching the OS.
//!
//! # Threading contract
//!
//! `install`, `uninstall`, `current_thread_id` and `next_message` are called
//! only from the capture thread.  `post_quit` is called from controller
//! threads.  `call_next_hook` is called from the hook procedure, which also
//! runs on the capture thread.

use std::sync::Arc;

use keyhook_core::message::{WM_KEYDOWN, WM_KEYUP, WM_SYSKEYDOWN};

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Opaque native hook handle (`HHOOK`), stored as an integer so it is `Send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookHandle(pub isize);

/// Platform-neutral view of one hook procedure invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Hook code (`nCode`); only `HC_ACTION` describes a real input event.
    pub n_code: i32,
    /// Message kind (`wParam`), e.g. `WM_KEYDOWN`.
    pub message: u32,
    /// Raw `lParam`, passed through untouched when forwarding.
    pub l_param: isize,
    /// Virtual key code from `KBDLLHOOKSTRUCT`, zero when `n_code` is negative.
    pub vk_code: u32,
    /// Hardware scan code from `KBDLLHOOKSTRUCT`, zero when `n_code` is negative.
    pub scan_code: u32,
}

impl RawKeyEvent {
    /// An `HC_ACTION` event with the given message kind.
    pub fn action(message: u32, vk_code: u32, scan_code: u32) -> Self {
        Self {
            n_code: keyhook_core::message::HC_ACTION,
            message,
            l_param: 0,
            vk_code,
            scan_code,
        }
    }

    pub fn key_down(vk_code: u32, scan_code: u32) -> Self {
        Self::action(WM_KEYDOWN, vk_code, scan_code)
    }

    pub fn key_up(vk_code: u32, scan_code: u32) -> Self {
        Self::action(WM_KEYUP, vk_code, scan_code)
    }

    pub fn sys_key_down(vk_code: u32, scan_code: u32) -> Self {
        Self::action(WM_SYSKEYDOWN, vk_code, scan_code)
    }
}

/// The hook procedure handed to [`HookPlatform::install`].
///
/// Receives every raw callback and returns the value the OS hook procedure
/// must return (the result of forwarding to the next hook).
pub type HookProc = Arc<dyn Fn(&RawKeyEvent) -> isize + Send + Sync>;

/// Outcome of one blocking message retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// A message was retrieved (hook callbacks may have run meanwhile).
    Continue,
    /// `WM_QUIT` was retrieved.
    Quit,
    /// Retrieval failed with the given platform return code.
    Failed(i32),
}

/// Abstraction over the native low-level keyboard hook subsystem.
#[cfg_attr(test, mockall::automock)]
pub trait HookPlatform: Send + Sync {
    /// Installs a low-level keyboard hook bound to the calling thread's
    /// message loop.  Returns `None` when the OS refuses the hook.
    fn install(&self, hook_proc: HookProc) -> Option<HookHandle>;

    /// Removes a hook previously returned by [`install`](Self::install).
    fn uninstall(&self, handle: HookHandle) -> bool;

    /// Forwards a raw event to the next hook in the system-wide chain.
    fn call_next_hook(&self, handle: Option<HookHandle>, raw: &RawKeyEvent) -> isize;

    /// Native identifier of the calling thread.
    fn current_thread_id(&self) -> u32;

    /// Posts `WM_QUIT` to the given thread's message queue.
    fn post_quit(&self, thread_id: u32) -> bool;

    /// Blocks until the calling thread's queue yields a message.
    fn next_message(&self) -> PumpStatus;
}
