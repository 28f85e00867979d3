//! KeyHook: the public facade over one capture thread and one native hook.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──start()──▶ Starting ──hook installed──▶ Running ──stop()──▶ Stopping
//!                         │                            │                  │
//!                         └──install failed──▶ Stopped ◀──loop exited─────┘
//! ```
//!
//! A `KeyHook` is single-use: once it has left `Created` it cannot be
//! started again.  Create a new instance to retry.
//!
//! `start()` blocks until the capture thread has tried to install the hook.
//! `stop()` only posts `WM_QUIT` to the capture thread and returns at once;
//! use [`KeyHook::join`] (or [`KeyHook::take_thread`]) to wait for the hook to
//! be uninstalled.
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(target_os = "windows")]
//! # fn demo() -> Result<(), keyhook::KeyHookError> {
//! let hook = keyhook::KeyHook::new();
//! hook.start()?.add_listener(|event| println!("{event}"));
//! std::thread::sleep(std::time::Duration::from_secs(10));
//! hook.stop().join()?;
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use keyhook_core::KeyEvent;
use tracing::{debug, warn};

use super::capture::{run_capture_thread, CAPTURE_THREAD_NAME};
use super::registry::Listener;
use super::state::{HookShared, HookStatus};
use crate::error::KeyHookError;
use crate::infrastructure::hook_platform::HookPlatform;

/// A global low-level keyboard hook delivering [`KeyEvent`]s to listeners.
///
/// All methods take `&self`; wrap the hook in an `Arc` to add listeners or
/// stop it from other threads.
pub struct KeyHook {
    platform: Arc<dyn HookPlatform>,
    shared: Arc<HookShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl KeyHook {
    /// Creates an unstarted hook backed by the Win32 low-level keyboard hook.
    #[cfg(target_os = "windows")]
    pub fn new() -> Self {
        Self::with_platform(Arc::new(
            crate::infrastructure::hook_platform::windows::WindowsHookPlatform::new(),
        ))
    }

    /// Creates an unstarted hook backed by `platform`.
    pub fn with_platform(platform: Arc<dyn HookPlatform>) -> Self {
        Self {
            platform,
            shared: Arc::new(HookShared::new()),
            thread: Mutex::new(None),
        }
    }

    /// Starts capturing keyboard events.
    ///
    /// Spawns the capture thread and blocks until it has tried to install the
    /// hook, which normally takes a negligible amount of time.  There is no
    /// timeout.
    ///
    /// # Errors
    ///
    /// - [`KeyHookError::AlreadyStarted`] if this hook has been started before.
    /// - [`KeyHookError::ThreadSpawn`] if the capture thread cannot be created.
    /// - [`KeyHookError::StartupInterrupted`] if the startup wait failed.  The
    ///   hook is left `Stopped`, or `Stopping` if it had already come up.
    /// - [`KeyHookError::InstallationFailed`] if the OS refused the hook.
    pub fn start(&self) -> Result<&Self, KeyHookError> {
        if !self
            .shared
            .status
            .transition(HookStatus::Created, HookStatus::Starting)
        {
            return Err(KeyHookError::AlreadyStarted);
        }
        debug!("starting key hook");

        let platform = Arc::clone(&self.platform);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.to_string())
            .spawn(move || run_capture_thread(platform, shared))
            .map_err(|e| {
                self.shared.status.store(HookStatus::Stopped);
                KeyHookError::ThreadSpawn(e)
            })?;
        *self.thread_slot() = Some(handle);

        if let Err(e) = self.shared.gate.wait() {
            // The capture thread may still be installing.  Whichever side wins
            // the status race tears the hook down.
            if !self
                .shared
                .status
                .transition(HookStatus::Starting, HookStatus::Stopped)
            {
                self.stop();
            }
            warn!(status = ?self.status(), "key hook startup interrupted");
            return Err(e);
        }

        if !self.shared.is_ready() {
            // The capture thread already marks a refused install as Stopped;
            // this covers a thread that died before reporting.
            self.shared
                .status
                .transition(HookStatus::Starting, HookStatus::Stopped);
            return Err(KeyHookError::InstallationFailed);
        }

        debug!(status = ?self.status(), "key hook started");
        Ok(self)
    }

    /// Adds a listener.  May be called from any thread, in any state.
    ///
    /// Listeners run on the shared capture thread, in registration order, and
    /// delay every other hook in the system while they run: return quickly.
    pub fn add_listener<F>(&self, listener: F) -> &Self
    where
        F: Fn(&KeyEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.add(Arc::new(listener));
        self
    }

    /// Adds an optional listener.
    ///
    /// # Errors
    ///
    /// Returns [`KeyHookError::MissingListener`] when `listener` is `None`.
    pub fn try_add_listener(&self, listener: Option<Listener>) -> Result<&Self, KeyHookError> {
        self.shared.listeners.try_add(listener)?;
        Ok(self)
    }

    /// Stops capturing key events.
    ///
    /// Posts `WM_QUIT` to the capture thread and returns without waiting.  Does
    /// nothing if the hook never became ready or is already stopping.
    pub fn stop(&self) -> &Self {
        let Some(&thread_id) = self.shared.thread_id.get() else {
            debug!("stop() before the hook was ready; nothing to do");
            return self;
        };

        if !self
            .shared
            .status
            .transition(HookStatus::Running, HookStatus::Stopping)
        {
            debug!(status = ?self.status(), "stop() ignored");
            return self;
        }

        if !self.platform.post_quit(thread_id) {
            warn!(thread_id, "failed to post WM_QUIT to capture thread");
        }
        self
    }

    /// Takes the capture thread's handle, leaving `None` behind.
    ///
    /// Returns `None` before `start()` or once the handle has been taken.
    pub fn take_thread(&self) -> Option<JoinHandle<()>> {
        self.thread_slot().take()
    }

    /// Waits for the capture thread to exit.  Returns immediately when there is
    /// no thread to wait for.
    ///
    /// Call [`stop`](Self::stop) first, or this blocks until the message loop
    /// fails on its own.
    ///
    /// # Errors
    ///
    /// Returns [`KeyHookError::ThreadPanicked`] if the capture thread panicked.
    pub fn join(&self) -> Result<(), KeyHookError> {
        match self.take_thread() {
            Some(handle) => handle.join().map_err(|_| KeyHookError::ThreadPanicked),
            None => Ok(()),
        }
    }

    /// Whether the capture thread has exited.  `false` if it was never started
    /// or its handle has been taken.
    pub fn is_finished(&self) -> bool {
        self.thread_slot()
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
    }

    pub fn status(&self) -> HookStatus {
        self.shared.status.load()
    }

    /// Whether the hook was installed successfully at some point.
    pub fn is_ready(&self) -> bool {
        self.shared.is_ready()
    }

    /// Native id of the capture thread, once the hook is installed.
    pub fn thread_id(&self) -> Option<u32> {
        self.shared.thread_id.get().copied()
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.len()
    }

    fn thread_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.thread.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(target_os = "windows")]
impl Default for KeyHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KeyHook {
    /// Posts `WM_QUIT` so a dropped hook never stays installed.  Does not join.
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for KeyHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyHook")
            .field("status", &self.status())
            .field("thread_id", &self.thread_id())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hook_platform::mock::{ScriptedHookPlatform, SCRIPTED_THREAD_ID};
    use crate::infrastructure::hook_platform::{
        HookHandle, HookProc, MockHookPlatform, PumpStatus, RawKeyEvent,
    };
    use std::time::{Duration, Instant};
    use keyhook_core::keycodes::VK_A;

    fn scripted_hook() -> (Arc<ScriptedHookPlatform>, KeyHook) {
        let platform = Arc::new(ScriptedHookPlatform::new());
        let hook = KeyHook::with_platform(platform.clone());
        (platform, hook)
    }

    // ── start ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_start_installs_hook_and_publishes_thread_id() {
        // Arrange
        let (platform, hook) = scripted_hook();

        // Act
        hook.start().expect("start should succeed");

        // Assert
        assert_eq!(hook.status(), HookStatus::Running);
        assert!(hook.is_ready());
        assert_eq!(hook.thread_id(), Some(SCRIPTED_THREAD_ID));
        assert_eq!(platform.install_count(), 1);

        hook.stop().join().expect("join");
    }

    #[test]
    fn test_start_fails_when_install_is_refused() {
        // Arrange
        let platform = Arc::new(ScriptedHookPlatform::refusing_install());
        let hook = KeyHook::with_platform(platform.clone());

        // Act
        let result = hook.start();

        // Assert
        assert!(matches!(result, Err(KeyHookError::InstallationFailed)));
        assert!(!hook.is_ready());
        assert_eq!(hook.thread_id(), None);
        assert_eq!(hook.status(), HookStatus::Stopped);
        hook.join().expect("capture thread exits after a refused install");
        assert_eq!(platform.uninstall_count(), 0);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let (_platform, hook) = scripted_hook();
        hook.start().expect("first start");

        let second = hook.start();

        assert!(matches!(second, Err(KeyHookError::AlreadyStarted)));
        hook.stop().join().expect("join");
    }

    #[test]
    fn test_restart_after_stop_is_rejected() {
        let (platform, hook) = scripted_hook();
        hook.start().expect("start");
        hook.stop().join().expect("join");

        assert!(matches!(hook.start(), Err(KeyHookError::AlreadyStarted)));
        assert_eq!(platform.install_count(), 1);
    }

    // ── stop ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_stop_before_start_is_a_noop() {
        let (platform, hook) = scripted_hook();

        hook.stop();

        assert_eq!(platform.quit_post_count(), 0);
        assert_eq!(hook.status(), HookStatus::Created);
        assert!(hook.take_thread().is_none());
    }

    #[test]
    fn test_stop_ends_loop_and_uninstalls_once() {
        // Arrange
        let (platform, hook) = scripted_hook();
        hook.start().expect("start");

        // Act
        hook.stop();
        hook.stop();
        hook.join().expect("join");
        hook.stop();

        // Assert
        assert_eq!(platform.quit_post_count(), 1);
        assert_eq!(platform.uninstall_count(), 1);
        assert!(!platform.is_installed());
        assert_eq!(hook.status(), HookStatus::Stopped);
    }

    #[test]
    fn test_drop_posts_quit_for_running_hook() {
        // Arrange
        let (platform, hook) = scripted_hook();
        hook.start().expect("start");
        let thread = hook.take_thread().expect("thread handle");

        // Act
        drop(hook);
        thread.join().expect("capture thread exits");

        // Assert
        assert_eq!(platform.quit_post_count(), 1);
        assert_eq!(platform.uninstall_count(), 1);
    }

    // ── listeners ─────────────────────────────────────────────────────────────

    #[test]
    fn test_add_listener_before_start_receives_events() {
        // Arrange
        let (platform, hook) = scripted_hook();
        let events = Arc::new(Mutex::new(Vec::new()));
        {
            let events = Arc::clone(&events);
            hook.add_listener(move |event| events.lock().unwrap().push(*event));
        }
        hook.start().expect("start");

        // Act
        platform.inject(RawKeyEvent::key_down(VK_A, 30));
        platform.inject(RawKeyEvent::key_up(VK_A, 30));
        hook.stop().join().expect("join");

        // Assert
        assert_eq!(
            *events.lock().unwrap(),
            vec![KeyEvent::down(VK_A, 30), KeyEvent::up(VK_A, 30)]
        );
    }

    #[test]
    fn test_try_add_listener_rejects_none_in_any_state() {
        let (_platform, hook) = scripted_hook();
        assert!(matches!(
            hook.try_add_listener(None),
            Err(KeyHookError::MissingListener)
        ));

        hook.start().expect("start");
        assert!(matches!(
            hook.try_add_listener(None),
            Err(KeyHookError::MissingListener)
        ));
        hook.stop().join().expect("join");

        let listener: Listener = Arc::new(|_: &KeyEvent| {});
        hook.try_add_listener(Some(listener)).expect("add after stop");
        assert_eq!(hook.listener_count(), 1);
    }

    // ── expectation-based platform ───────────────────────────────────────────

    #[test]
    fn test_refused_install_never_pumps_posts_or_uninstalls() {
        // Arrange
        let mut platform = MockHookPlatform::new();
        platform.expect_install().times(1).returning(|_| None);
        platform.expect_current_thread_id().never();
        platform.expect_next_message().never();
        platform.expect_uninstall().never();
        platform.expect_post_quit().never();
        let hook = KeyHook::with_platform(Arc::new(platform));

        // Act
        let result = hook.start();
        hook.stop();

        // Assert
        assert!(matches!(result, Err(KeyHookError::InstallationFailed)));
        hook.join().expect("join");
    }

    #[test]
    fn test_running_hook_posts_quit_to_recorded_thread_and_uninstalls_once() {
        // Arrange
        let (quit_tx, quit_rx) = std::sync::mpsc::channel::<()>();
        let quit_rx = Mutex::new(quit_rx);
        let mut platform = MockHookPlatform::new();
        platform
            .expect_install()
            .times(1)
            .returning(|_| Some(HookHandle(42)));
        platform.expect_current_thread_id().times(1).return_const(777u32);
        platform.expect_next_message().returning(move || {
            // Block like GetMessageW until stop() posts the quit message.
            let _ = quit_rx.lock().unwrap().recv();
            PumpStatus::Quit
        });
        platform
            .expect_post_quit()
            .withf(|thread_id| *thread_id == 777)
            .times(1)
            .returning(move |_| quit_tx.send(()).is_ok());
        platform
            .expect_uninstall()
            .withf(|handle| *handle == HookHandle(42))
            .times(1)
            .returning(|_| true);
        let hook = KeyHook::with_platform(Arc::new(platform));

        // Act
        hook.start().expect("start");
        hook.stop();
        hook.stop();
        hook.join().expect("join");

        // Assert
        assert_eq!(hook.thread_id(), Some(777));
        assert_eq!(hook.status(), HookStatus::Stopped);
    }

    // ── failure paths ─────────────────────────────────────────────────────────

    /// A platform whose hook installation panics on the capture thread.
    struct PanickingInstallPlatform;

    impl HookPlatform for PanickingInstallPlatform {
        fn install(&self, _hook_proc: HookProc) -> Option<HookHandle> {
            panic!("hook installation blew up");
        }
        fn uninstall(&self, _handle: HookHandle) -> bool {
            unreachable!("nothing was installed")
        }
        fn call_next_hook(&self, _handle: Option<HookHandle>, _raw: &RawKeyEvent) -> isize {
            unreachable!("nothing was installed")
        }
        fn current_thread_id(&self) -> u32 {
            unreachable!("nothing was installed")
        }
        fn post_quit(&self, _thread_id: u32) -> bool {
            unreachable!("the hook never became ready")
        }
        fn next_message(&self) -> PumpStatus {
            unreachable!("the loop is never entered")
        }
    }

    #[test]
    fn test_panicking_install_releases_start_and_join_reports_panic() {
        // Arrange
        let hook = KeyHook::with_platform(Arc::new(PanickingInstallPlatform));

        // Act
        let started = hook.start();
        hook.stop();
        let joined = hook.join();

        // Assert
        assert!(matches!(started, Err(KeyHookError::InstallationFailed)));
        assert_eq!(hook.status(), HookStatus::Stopped);
        assert!(!hook.is_ready());
        assert!(matches!(joined, Err(KeyHookError::ThreadPanicked)));
    }

    #[test]
    fn test_retrieval_failure_ends_capture_thread_and_uninstalls() {
        // Arrange
        let (platform, hook) = scripted_hook();
        hook.start().expect("start");

        // Act
        platform.inject_failure(-1);
        hook.join().expect("join");
        hook.stop();

        // Assert
        assert_eq!(hook.status(), HookStatus::Stopped);
        assert_eq!(platform.uninstall_count(), 1);
        assert!(!platform.is_installed());
        assert_eq!(platform.quit_post_count(), 0);
    }

    #[test]
    fn test_is_finished_follows_capture_thread() {
        // Arrange
        let (_platform, hook) = scripted_hook();
        assert!(!hook.is_finished());

        // Act / Assert: blocked in the message loop until stopped.
        hook.start().expect("start");
        assert!(!hook.is_finished());

        hook.stop();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !hook.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(hook.is_finished());
        assert_eq!(hook.status(), HookStatus::Stopped);

        hook.join().expect("join");
        assert!(!hook.is_finished());
    }

    #[test]
    fn test_interrupted_startup_leaves_no_hook_installed() {
        // Arrange
        let (platform, hook) = scripted_hook();
        hook.shared.gate.poison();

        // Act
        let result = hook.start();
        hook.join().expect("join");

        // Assert
        assert!(matches!(result, Err(KeyHookError::StartupInterrupted)));
        assert_eq!(hook.status(), HookStatus::Stopped);
        assert_eq!(platform.install_count(), 1);
        assert_eq!(platform.uninstall_count(), 1);
        assert!(!platform.is_installed());
    }
}
