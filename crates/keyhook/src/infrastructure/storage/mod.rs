//! Storage infrastructure: configuration file persistence for `keyhook-tap`.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform-appropriate directory (or an explicit path), writes it back, and
//! supplies defaults when the file does not exist yet.

pub mod config;
