//! Panel client implementations

/// Shared utilities used by panel clients.
pub mod common;

mod rest;

pub use rest::RestPanelClient;
