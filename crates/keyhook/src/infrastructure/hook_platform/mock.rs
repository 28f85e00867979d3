//! Scripted hook platform for tests and benchmarks.
//!
//! Mimics the Win32 behaviour the capture thread relies on: raw events queued
//! with [`ScriptedHookPlatform::inject`] are delivered to the installed hook
//! procedure from inside [`HookPlatform::next_message`], i.e. on the capture
//! thread, and `WM_QUIT` posted to the capture thread ends the pump.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc::{self, Receiver, Sender},
    Arc, Mutex, MutexGuard, PoisonError,
};

use super::{HookHandle, HookPlatform, HookProc, PumpStatus, RawKeyEvent};

/// Thread id reported by [`ScriptedHookPlatform::current_thread_id`].
pub const SCRIPTED_THREAD_ID: u32 = 0x4B48;

/// Handle returned by a successful scripted install.
pub const SCRIPTED_HOOK_HANDLE: HookHandle = HookHandle(0x1000);

/// Value returned by the scripted `call_next_hook`.
pub const FORWARD_RESULT: isize = 0;

enum Queued {
    Key(RawKeyEvent),
    Quit,
    Fail(i32),
}

/// A hook platform driven by an in-memory message queue.
pub struct ScriptedHookPlatform {
    queue_tx: Sender<Queued>,
    queue_rx: Mutex<Receiver<Queued>>,
    hook_proc: Mutex<Option<HookProc>>,
    refuse_install: AtomicBool,
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
    quit_posts: AtomicUsize,
    last_forward_had_handle: AtomicBool,
    forwarded: Mutex<Vec<RawKeyEvent>>,
    journal: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHookPlatform {
    pub fn new() -> Self {
        let (queue_tx, queue_rx) = mpsc::channel();
        Self {
            queue_tx,
            queue_rx: Mutex::new(queue_rx),
            hook_proc: Mutex::new(None),
            refuse_install: AtomicBool::new(false),
            installs: AtomicUsize::new(0),
            uninstalls: AtomicUsize::new(0),
            quit_posts: AtomicUsize::new(0),
            last_forward_had_handle: AtomicBool::new(false),
            forwarded: Mutex::new(Vec::new()),
            journal: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A platform whose `install` always fails.
    pub fn refusing_install() -> Self {
        let platform = Self::new();
        platform.refuse_install.store(true, Ordering::SeqCst);
        platform
    }

    /// Queues a raw event for delivery on the capture thread.
    pub fn inject(&self, raw: RawKeyEvent) {
        // The receiver lives in `self`, so the send cannot fail.
        let _ = self.queue_tx.send(Queued::Key(raw));
    }

    /// Makes the next message retrieval fail with `code`.
    pub fn inject_failure(&self, code: i32) {
        let _ = self.queue_tx.send(Queued::Fail(code));
    }

    /// Shared journal; `call_next_hook` appends `"forward:<vk>"`.
    ///
    /// Tests append their own entries from listeners to check ordering.
    pub fn journal(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.journal)
    }

    pub fn journal_entries(&self) -> Vec<String> {
        lock(&self.journal).clone()
    }

    /// Every raw event passed to `call_next_hook`, in order.
    pub fn forwarded(&self) -> Vec<RawKeyEvent> {
        lock(&self.forwarded).clone()
    }

    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstall_count(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }

    pub fn quit_post_count(&self) -> usize {
        self.quit_posts.load(Ordering::SeqCst)
    }

    /// Whether the last forward used a real handle rather than the null placeholder.
    pub fn last_forward_used_handle(&self) -> bool {
        self.last_forward_had_handle.load(Ordering::SeqCst)
    }

    /// Whether a hook procedure is currently installed.
    pub fn is_installed(&self) -> bool {
        lock(&self.hook_proc).is_some()
    }
}

impl Default for ScriptedHookPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HookPlatform for ScriptedHookPlatform {
    fn install(&self, hook_proc: HookProc) -> Option<HookHandle> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.refuse_install.load(Ordering::SeqCst) {
            return None;
        }
        *lock(&self.hook_proc) = Some(hook_proc);
        Some(SCRIPTED_HOOK_HANDLE)
    }

    fn uninstall(&self, handle: HookHandle) -> bool {
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        // Dropping the procedure also releases the Arc cycle back to `self`.
        lock(&self.hook_proc).take().is_some() && handle == SCRIPTED_HOOK_HANDLE
    }

    fn call_next_hook(&self, handle: Option<HookHandle>, raw: &RawKeyEvent) -> isize {
        self.last_forward_had_handle
            .store(handle.is_some(), Ordering::SeqCst);
        lock(&self.forwarded).push(*raw);
        lock(&self.journal).push(format!("forward:{}", raw.vk_code));
        FORWARD_RESULT
    }

    fn current_thread_id(&self) -> u32 {
        SCRIPTED_THREAD_ID
    }

    fn post_quit(&self, thread_id: u32) -> bool {
        if thread_id != SCRIPTED_THREAD_ID {
            return false;
        }
        self.quit_posts.fetch_add(1, Ordering::SeqCst);
        self.queue_tx.send(Queued::Quit).is_ok()
    }

    fn next_message(&self) -> PumpStatus {
        let next = lock(&self.queue_rx).recv();
        match next {
            Ok(Queued::Key(raw)) => {
                let hook_proc = lock(&self.hook_proc).clone();
                if let Some(hook_proc) = hook_proc {
                    hook_proc(&raw);
                }
                PumpStatus::Continue
            }
            Ok(Queued::Quit) => PumpStatus::Quit,
            Ok(Queued::Fail(code)) => PumpStatus::Failed(code),
            Err(_) => PumpStatus::Failed(-1),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
