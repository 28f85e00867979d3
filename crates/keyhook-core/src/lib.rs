//! # keyhook-core
//!
//! Shared, OS-independent data for the keyhook workspace: the [`KeyEvent`]
//! value handed to listeners, the low-level hook message kinds used to decide
//! which raw callbacks become events, and the Windows virtual-key table.
//!
//! It has zero dependencies on OS APIs, threads, or the hook lifecycle; those
//! live in the `keyhook` crate.
//!
//! # What does a low-level keyboard hook deliver? (for beginners)
//!
//! Windows calls a `WH_KEYBOARD_LL` hook procedure once per raw keyboard
//! input, system-wide.  Each call carries three things:
//!
//! - a **hook code** (`nCode`): `HC_ACTION` when the call describes a real
//!   input event,
//! - a **message kind** (`wParam`): `WM_KEYDOWN`, `WM_KEYUP`, or one of the
//!   `WM_SYS*` variants used while Alt is held,
//! - a pointer to a `KBDLLHOOKSTRUCT` carrying the **virtual key code**
//!   (layout-independent logical key) and the **scan code** (physical key
//!   position).
//!
//! # Sub-modules
//!
//! - **`message`** – The hook code and message constants, plus
//!   [`KeyMessage`] which classifies a raw `wParam`.
//! - **`event`** – [`KeyEvent`], the immutable value built from a qualifying
//!   callback.
//! - **`keycodes`** – `VK_*` constants and name lookups.

pub mod event;
pub mod keycodes;
pub mod message;

pub use event::KeyEvent;
pub use keycodes::{vk_from_name, vk_name};
pub use message::KeyMessage;
