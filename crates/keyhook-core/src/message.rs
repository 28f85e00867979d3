//! Low-level keyboard hook codes and message kinds.
//!
//! The numeric values match `winuser.h` so the same classification runs on
//! every platform, including the test doubles used off Windows.

/// Hook code meaning "the callback describes a real input event".
pub const HC_ACTION: i32 = 0;

/// A non-system key was pressed.
pub const WM_KEYDOWN: u32 = 0x0100;
/// A non-system key was released.
pub const WM_KEYUP: u32 = 0x0101;
/// A key was pressed while Alt was held (or F10).
pub const WM_SYSKEYDOWN: u32 = 0x0104;
/// A key was released while Alt was held.
pub const WM_SYSKEYUP: u32 = 0x0105;

/// Classification of the `wParam` passed to a low-level keyboard hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMessage {
    KeyDown,
    KeyUp,
    SysKeyDown,
    SysKeyUp,
    /// Any message value the hook does not recognise.
    Other(u32),
}

impl KeyMessage {
    /// Classifies a raw `wParam` value.
    pub fn from_raw(message: u32) -> Self {
        match message {
            WM_KEYDOWN => KeyMessage::KeyDown,
            WM_KEYUP => KeyMessage::KeyUp,
            WM_SYSKEYDOWN => KeyMessage::SysKeyDown,
            WM_SYSKEYUP => KeyMessage::SysKeyUp,
            other => KeyMessage::Other(other),
        }
    }

    /// Returns the raw `wParam` value for this message.
    pub fn to_raw(self) -> u32 {
        match self {
            KeyMessage::KeyDown => WM_KEYDOWN,
            KeyMessage::KeyUp => WM_KEYUP,
            KeyMessage::SysKeyDown => WM_SYSKEYDOWN,
            KeyMessage::SysKeyUp => WM_SYSKEYUP,
            KeyMessage::Other(raw) => raw,
        }
    }

    /// Key direction for messages that produce a [`KeyEvent`](crate::KeyEvent).
    ///
    /// Only plain `WM_KEYDOWN` / `WM_KEYUP` qualify; the system-key variants
    /// and unknown messages return `None`.
    pub fn key_direction(self) -> Option<bool> {
        match self {
            KeyMessage::KeyDown => Some(true),
            KeyMessage::KeyUp => Some(false),
            _ => None,
        }
    }
}
