//! Utility modules

pub mod account_lock;
pub mod fingerprint;
