//! Windows `WH_KEYBOARD_LL` implementation of [`HookPlatform`].
//!
//! Low-level hook procedures receive no user-data pointer, and Windows calls
//! them on the thread that installed the hook, from inside that thread's
//! `GetMessageW`.  The installed [`HookProc`] is therefore kept in a
//! thread-local on the capture thread and reached from a fixed-signature
//! `extern "system"` trampoline.  Each capture thread has its own slot, so
//! independent hook instances never share state.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};
use windows::Win32::Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, GetMessageW, PostThreadMessageW, SetWindowsHookExW, UnhookWindowsHookEx,
    HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_QUIT,
};

use super::{HookHandle, HookPlatform, HookProc, PumpStatus, RawKeyEvent};

thread_local! {
    /// Hook procedure installed on the current (capture) thread.
    static THREAD_HOOK_PROC: RefCell<Option<HookProc>> = const { RefCell::new(None) };
}

/// The real Win32 low-level keyboard hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsHookPlatform;

impl WindowsHookPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl HookPlatform for WindowsHookPlatform {
    fn install(&self, hook_proc: HookProc) -> Option<HookHandle> {
        THREAD_HOOK_PROC.with(|slot| *slot.borrow_mut() = Some(hook_proc));

        // SAFETY: GetModuleHandleW(None) returns the handle of the running
        // executable and does not transfer ownership.
        let module = unsafe { GetModuleHandleW(None) }
            .ok()
            .map(|module| HINSTANCE(module.0));

        // SAFETY: `keyboard_hook_proc` matches the HOOKPROC signature and
        // lives for the whole program.  The calling thread pumps messages in
        // `next_message`, which is what delivers low-level hook callbacks.
        match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), module, 0) } {
            Ok(hook) => Some(HookHandle(hook.0 as isize)),
            Err(e) => {
                error!("SetWindowsHookExW(WH_KEYBOARD_LL) failed: {e}");
                THREAD_HOOK_PROC.with(|slot| slot.borrow_mut().take());
                None
            }
        }
    }

    fn uninstall(&self, handle: HookHandle) -> bool {
        // SAFETY: `handle` was returned by SetWindowsHookExW on this thread.
        let result = unsafe { UnhookWindowsHookEx(HHOOK(handle.0 as *mut c_void)) };
        THREAD_HOOK_PROC.with(|slot| slot.borrow_mut().take());
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("UnhookWindowsHookEx failed: {e}");
                false
            }
        }
    }

    fn call_next_hook(&self, handle: Option<HookHandle>, raw: &RawKeyEvent) -> isize {
        forward(handle, raw.n_code, WPARAM(raw.message as usize), LPARAM(raw.l_param)).0
    }

    fn current_thread_id(&self) -> u32 {
        // SAFETY: GetCurrentThreadId has no preconditions.
        unsafe { GetCurrentThreadId() }
    }

    fn post_quit(&self, thread_id: u32) -> bool {
        // SAFETY: posting WM_QUIT to a thread id has no memory-safety
        // requirements; an exited thread makes the call fail.
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.is_ok()
    }

    fn next_message(&self) -> PumpStatus {
        let mut msg = MSG::default();
        // SAFETY: `msg` is a valid out-pointer; a `None` window retrieves
        // both window and thread messages for the calling thread.
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) }.0;
        match ret {
            r if r > 0 => PumpStatus::Continue,
            0 => PumpStatus::Quit,
            r => PumpStatus::Failed(r),
        }
    }
}

fn forward(handle: Option<HookHandle>, n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    let hook = handle.map(|h| HHOOK(h.0 as *mut c_void));
    // SAFETY: forwarding the exact arguments we were called with is the
    // documented hook-chain contract.
    unsafe { CallNextHookEx(hook, n_code, w_param, l_param) }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows on the capture thread.  `l_param` points to a
/// `KBDLLHOOKSTRUCT` whenever `n_code == HC_ACTION`.  A panic must never
/// unwind across this frame, so it is caught and the event still forwarded.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    let (vk_code, scan_code) = if n_code == HC_ACTION as i32 && l_param.0 != 0 {
        // SAFETY: see above; the struct is valid for the duration of the call.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        (kbs.vkCode, kbs.scanCode)
    } else {
        (0, 0)
    };

    let raw = RawKeyEvent {
        n_code,
        message: w_param.0 as u32,
        l_param: l_param.0,
        vk_code,
        scan_code,
    };

    // Clone the procedure out so the RefCell is not borrowed while it runs.
    let hook_proc = THREAD_HOOK_PROC.with(|slot| slot.borrow().clone());
    let Some(hook_proc) = hook_proc else {
        return forward(None, n_code, w_param, l_param);
    };

    match panic::catch_unwind(AssertUnwindSafe(|| hook_proc(&raw))) {
        Ok(result) => LRESULT(result),
        Err(_) => {
            error!("keyboard hook procedure panicked; forwarding event");
            forward(None, n_code, w_param, l_param)
        }
    }
}
