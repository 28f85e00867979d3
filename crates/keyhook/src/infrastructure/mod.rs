//! Infrastructure layer.
//!
//! Contains the OS-facing keyboard hook adapter and file-system storage for
//! the `keyhook-tap` configuration.
//!
//! **Dependency rule**: this layer may depend on `keyhook_core`, but MUST NOT
//! import the `application` layer.

pub mod hook_platform;
pub mod storage;
