//! Utility modules.

/// Log sanitization utilities to keep panel responses out of logs in full.
pub mod log_sanitizer;
