//! ui
//!
//! User-facing terminal output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing for CLI commands
//!
//! Logs go through `tracing`; this module is only for what a person at the
//! terminal is meant to read.

pub mod output;
