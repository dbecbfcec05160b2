//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

pub use hostsync_panel::{PanelError, PanelFailureKind};

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Hosting account not found
    #[error("Hosting account not found: {0}")]
    AccountNotFound(i64),

    /// Hosting account has no external identifier yet
    #[error("Hosting account {0} is not linked to a panel account")]
    AccountNotLinked(i64),

    /// No panel client registered for the server
    #[error("No panel registered for server {0}")]
    ServerNotFound(i64),

    /// Managed resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(i64),

    /// Panel could not be reached or refused the whole operation
    #[error("Remote panel unavailable: {0}")]
    RemoteUnavailable(String),

    /// Local store failure
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Identity collision that is not resolved automatically
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An attached external identifier cannot be replaced
    #[error(
        "Hosting account {account_id} is already linked to '{current}', refusing '{requested}'"
    )]
    ExternalIdImmutable {
        account_id: i64,
        current: String,
        requested: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Panel error (converted from the client library)
    #[error("{0}")]
    Panel(#[from] PanelError),
}

impl CoreError {
    /// Whether the caller should see a 404-equivalent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::AccountNotFound(_)
            | Self::AccountNotLinked(_)
            | Self::ServerNotFound(_)
            | Self::ResourceNotFound(_) => true,
            Self::Panel(e) => e.failure_kind() == PanelFailureKind::NotFound,
            _ => false,
        }
    }

    /// Whether it is expected behavior (bad input, missing resource, ...), used for log levels.
    ///
    /// Use `warn` when this returns `true` and `error` when it returns `false`.
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::AccountNotFound(_)
            | Self::AccountNotLinked(_)
            | Self::ServerNotFound(_)
            | Self::ResourceNotFound(_)
            | Self::Conflict(_)
            | Self::ValidationError(_)
            | Self::ExternalIdImmutable { .. } => true,
            Self::Panel(e) => e.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
