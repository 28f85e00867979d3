//! Application layer: the hook controller and the pieces it coordinates.
//!
//! # What lives here? (for beginners)
//!
//! Everything in this layer talks to the operating system only through the
//! [`HookPlatform`](crate::infrastructure::hook_platform::HookPlatform) trait,
//! so the whole lifecycle can be exercised in tests with a scripted platform.
//!
//! # Sub-modules
//!
//! - **`controller`** – [`KeyHook`](controller::KeyHook), the public facade:
//!   start, stop, add listeners, join the capture thread.
//!
//! - **`capture`** – The capture thread body and the hook procedure.  This is
//!   the hot path: it runs for every keystroke in the whole system.
//!
//! - **`registry`** – The copy-on-write listener collection.
//!
//! - **`startup`** – The one-shot gate `start()` waits on.
//!
//! - **`state`** – Lifecycle status shared with the capture thread.

pub mod capture;
pub mod controller;
pub mod registry;
pub mod startup;
pub mod state;
