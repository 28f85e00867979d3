//! The key event value delivered to listeners.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keycodes::vk_name;
use crate::message::KeyMessage;

/// One key-down or key-up observed by the hook.
///
/// Built once per qualifying hook callback and handed to every listener by
/// reference.  The hook never keeps it after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Windows virtual key code, see [`crate::keycodes`] for named constants.
    pub vk_code: u32,
    /// Hardware scan code.
    pub scan_code: u32,
    /// `true` for key-down, `false` for key-up.
    pub is_down: bool,
}

impl KeyEvent {
    pub fn new(vk_code: u32, scan_code: u32, is_down: bool) -> Self {
        Self {
            vk_code,
            scan_code,
            is_down,
        }
    }

    pub fn down(vk_code: u32, scan_code: u32) -> Self {
        Self::new(vk_code, scan_code, true)
    }

    pub fn up(vk_code: u32, scan_code: u32) -> Self {
        Self::new(vk_code, scan_code, false)
    }

    /// Builds an event from a raw hook message.
    ///
    /// Returns `None` for every message other than `WM_KEYDOWN` / `WM_KEYUP`.
    pub fn from_message(message: KeyMessage, vk_code: u32, scan_code: u32) -> Option<Self> {
        message
            .key_direction()
            .map(|is_down| Self::new(vk_code, scan_code, is_down))
    }

    /// The `VK_*` name of the key, when the code has one.
    pub fn key_name(&self) -> Option<&'static str> {
        vk_name(self.vk_code)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyEvent(code: {}, state: {})",
            self.vk_code,
            if self.is_down { "down" } else { "up" }
        )
    }
}
