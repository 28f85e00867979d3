//! keyhook library entry point.
//!
//! A global low-level keyboard hook that republishes every key-down and key-up
//! in the system to in-process listeners.  The binary `keyhook-tap` and the
//! integration tests in `tests/` share this module tree.
//!
//! ```text
//! OS hook chain ──▶ capture thread ──▶ hook procedure ──▶ listeners (in order)
//!                                           │
//!                                           └──▶ next hook in the chain
//! ```

pub mod application;
pub mod error;
pub mod infrastructure;
pub mod output;

pub use application::controller::KeyHook;
pub use application::registry::{DispatchReport, Listener, ListenerRegistry};
pub use application::state::HookStatus;
pub use error::KeyHookError;
pub use infrastructure::hook_platform::mock::ScriptedHookPlatform;
pub use infrastructure::hook_platform::{HookPlatform, RawKeyEvent};
pub use keyhook_core::KeyEvent;
