//! The capture thread and the hook procedure it installs.
//!
//! # Lifecycle of the capture thread
//!
//! ```text
//! install hook ──fail──▶ status = Stopped ─┐
//!      │                                   ├─▶ release StartupGate ─▶ (return)
//!      └─ok─▶ publish id, status = Running ┘          │
//!                                                     ▼
//!                      pump messages until WM_QUIT or a retrieval error
//!                                                     │
//!                      uninstall hook, status = Stopped, return
//! ```
//!
//! # The hook procedure
//!
//! For every raw callback: build a [`KeyEvent`] only for `HC_ACTION` +
//! `WM_KEYDOWN`/`WM_KEYUP`, dispatch it to the listeners synchronously, then
//! forward the raw event to the next hook.  Forwarding happens for *every*
//! callback; skipping it would break the hook chain of every other process.
//!
//! Forwarding uses a null hook handle, not the handle returned by install.
//! Windows ignores the handle argument of `CallNextHookEx`.

use std::sync::Arc;

use keyhook_core::message::HC_ACTION;
use keyhook_core::{KeyEvent, KeyMessage};
use tracing::{debug, error, info, trace, warn};

use super::registry::ListenerRegistry;
use super::state::{HookShared, HookStatus};
use crate::infrastructure::hook_platform::{HookPlatform, HookProc, PumpStatus, RawKeyEvent};

/// Name given to every capture thread.
pub const CAPTURE_THREAD_NAME: &str = "keyhook-capture";

/// Converts a raw callback into a key event, if it qualifies.
pub fn key_event_from_raw(raw: &RawKeyEvent) -> Option<KeyEvent> {
    if raw.n_code != HC_ACTION {
        return None;
    }
    KeyEvent::from_message(KeyMessage::from_raw(raw.message), raw.vk_code, raw.scan_code)
}

/// Handles one raw callback: dispatch (if qualifying), then always forward.
pub fn handle_raw_event(
    platform: &dyn HookPlatform,
    listeners: &ListenerRegistry,
    raw: &RawKeyEvent,
) -> isize {
    if let Some(event) = key_event_from_raw(raw) {
        let report = listeners.dispatch(&event);
        trace!(%event, delivered = report.delivered, panicked = report.panicked, "dispatched");
    }
    platform.call_next_hook(None, raw)
}

/// Builds the hook procedure handed to [`HookPlatform::install`].
pub fn hook_proc(platform: Arc<dyn HookPlatform>, listeners: ListenerRegistry) -> HookProc {
    Arc::new(move |raw: &RawKeyEvent| handle_raw_event(platform.as_ref(), &listeners, raw))
}

/// Body of the capture thread.
pub(crate) fn run_capture_thread(platform: Arc<dyn HookPlatform>, shared: Arc<HookShared>) {
    let handle = {
        let _release = shared.gate.release_on_drop();

        let callback = hook_proc(Arc::clone(&platform), shared.listeners.clone());
        let Some(handle) = platform.install(callback) else {
            error!("failed to install low-level keyboard hook");
            shared.status.store(HookStatus::Stopped);
            return;
        };

        let thread_id = platform.current_thread_id();
        // Only this thread ever sets the id, exactly once.  It must be visible
        // before Running so that `stop()` can always reach a running loop.
        let _ = shared.thread_id.set(thread_id);
        if !shared
            .status
            .transition(HookStatus::Starting, HookStatus::Running)
        {
            warn!(thread_id, "startup was abandoned; removing keyboard hook");
            platform.uninstall(handle);
            shared.status.store(HookStatus::Stopped);
            return;
        }
        info!(thread_id, "low-level keyboard hook installed");
        handle
    };

    loop {
        match platform.next_message() {
            PumpStatus::Continue => continue,
            PumpStatus::Quit => {
                debug!("capture thread received WM_QUIT");
                break;
            }
            PumpStatus::Failed(code) => {
                error!(code, "message retrieval failed; leaving capture loop");
                break;
            }
        }
    }

    if platform.uninstall(handle) {
        info!("low-level keyboard hook uninstalled");
    } else {
        error!("failed to uninstall low-level keyboard hook");
    }
    shared.status.store(HookStatus::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hook_platform::mock::{ScriptedHookPlatform, FORWARD_RESULT};
    use keyhook_core::keycodes::VK_A;
    use std::sync::Mutex;

    fn collecting(registry: &ListenerRegistry) -> Arc<Mutex<Vec<KeyEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        registry.add(Arc::new(move |event: &KeyEvent| sink.lock().unwrap().push(*event)));
        events
    }

    #[test]
    fn test_key_event_from_raw_only_for_action_key_messages() {
        assert_eq!(
            key_event_from_raw(&RawKeyEvent::key_down(VK_A, 30)),
            Some(KeyEvent::down(VK_A, 30))
        );
        assert_eq!(
            key_event_from_raw(&RawKeyEvent::key_up(VK_A, 30)),
            Some(KeyEvent::up(VK_A, 30))
        );
        assert_eq!(key_event_from_raw(&RawKeyEvent::sys_key_down(VK_A, 30)), None);

        let mut negative = RawKeyEvent::key_down(VK_A, 30);
        negative.n_code = -1;
        assert_eq!(key_event_from_raw(&negative), None);
    }

    #[test]
    fn test_handle_raw_event_dispatches_then_forwards() {
        // Arrange
        let platform = ScriptedHookPlatform::new();
        let registry = ListenerRegistry::new();
        let events = collecting(&registry);
        let raw = RawKeyEvent::key_down(VK_A, 30);

        // Act
        let result = handle_raw_event(&platform, &registry, &raw);

        // Assert
        assert_eq!(result, FORWARD_RESULT);
        assert_eq!(*events.lock().unwrap(), vec![KeyEvent::down(VK_A, 30)]);
        assert_eq!(platform.forwarded(), vec![raw]);
    }

    #[test]
    fn test_ignored_messages_are_still_forwarded() {
        // Arrange
        let platform = ScriptedHookPlatform::new();
        let registry = ListenerRegistry::new();
        let events = collecting(&registry);
        let sys = RawKeyEvent::sys_key_down(VK_A, 30);
        let other = RawKeyEvent::action(0x0200, 0, 0);

        // Act
        handle_raw_event(&platform, &registry, &sys);
        handle_raw_event(&platform, &registry, &other);

        // Assert
        assert!(events.lock().unwrap().is_empty());
        assert_eq!(platform.forwarded(), vec![sys, other]);
    }

    #[test]
    fn test_forward_survives_panicking_listener() {
        // Arrange
        let platform = ScriptedHookPlatform::new();
        let registry = ListenerRegistry::new();
        registry.add(Arc::new(|_: &KeyEvent| panic!("listener failure")));

        // Act
        let result = handle_raw_event(&platform, &registry, &RawKeyEvent::key_down(VK_A, 30));

        // Assert
        assert_eq!(result, FORWARD_RESULT);
        assert_eq!(platform.forwarded().len(), 1);
    }

    #[test]
    fn test_forward_uses_null_placeholder_handle() {
        let platform = ScriptedHookPlatform::new();
        let registry = ListenerRegistry::new();

        handle_raw_event(&platform, &registry, &RawKeyEvent::key_up(VK_A, 30));

        assert!(!platform.last_forward_used_handle());
    }

    #[test]
    fn test_capture_thread_marks_stopped_when_install_fails() {
        // Arrange
        let platform: Arc<dyn HookPlatform> = Arc::new(ScriptedHookPlatform::refusing_install());
        let shared = Arc::new(HookShared::new());

        // Act: runs to completion on this thread since install fails.
        run_capture_thread(platform, Arc::clone(&shared));

        // Assert
        assert_eq!(shared.status.load(), HookStatus::Stopped);
        assert!(!shared.is_ready());
        assert!(shared.gate.is_released());
    }

    #[test]
    fn test_capture_thread_uninstalls_after_retrieval_error() {
        // Arrange
        let scripted = Arc::new(ScriptedHookPlatform::new());
        scripted.inject(RawKeyEvent::key_down(VK_A, 30));
        scripted.inject_failure(-1);
        let shared = Arc::new(HookShared::new());
        shared.status.store(HookStatus::Starting);
        let events = collecting(&shared.listeners);

        // Act
        run_capture_thread(scripted.clone(), Arc::clone(&shared));

        // Assert
        assert_eq!(*events.lock().unwrap(), vec![KeyEvent::down(VK_A, 30)]);
        assert_eq!(scripted.uninstall_count(), 1);
        assert!(!scripted.is_installed());
        assert_eq!(shared.status.load(), HookStatus::Stopped);
        assert!(shared.is_ready());
    }

    #[test]
    fn test_capture_thread_removes_hook_when_startup_was_abandoned() {
        // Arrange: the controller already gave up and marked itself Stopped.
        let scripted = Arc::new(ScriptedHookPlatform::new());
        let shared = Arc::new(HookShared::new());
        shared.status.store(HookStatus::Stopped);

        // Act: returns without pumping, so this cannot block.
        run_capture_thread(scripted.clone(), Arc::clone(&shared));

        // Assert
        assert_eq!(scripted.install_count(), 1);
        assert_eq!(scripted.uninstall_count(), 1);
        assert!(!scripted.is_installed());
        assert_eq!(shared.status.load(), HookStatus::Stopped);
        assert!(shared.gate.is_released());
    }
}
