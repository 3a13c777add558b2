// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for tracking.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console logging, and the `track` command implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Console logging macros.
pub mod logging;

/// Tracking logic.
pub mod track;
