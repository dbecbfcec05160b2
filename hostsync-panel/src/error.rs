use serde::{Deserialize, Serialize};

use crate::types::ResourceKind;

/// Unified error type for all control panel operations.
///
/// Each variant includes a `panel` field identifying which panel client produced
/// the error, plus variant-specific context. All variants are serializable for
/// structured error reporting.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on retry:
/// - [`NetworkError`](Self::NetworkError): network connectivity issues
/// - [`Timeout`](Self::Timeout): request timed out
/// - [`RateLimited`](Self::RateLimited): API rate limit exceeded
///
/// Retries are opt-in through [`PanelOptions::max_retries`](crate::PanelOptions).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum PanelError {
    /// A network-level error occurred (DNS resolution failure, connection refused, 5xx gateway).
    NetworkError {
        /// Panel that produced the error.
        panel: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Panel that produced the error.
        panel: String,
        /// Error details.
        detail: String,
    },

    /// The API rate limit has been exceeded (HTTP 429 or equivalent).
    RateLimited {
        /// Panel that produced the error.
        panel: String,
        /// Suggested wait time in seconds before retrying, if provided by the API.
        retry_after: Option<u64>,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// The reseller credentials are invalid or expired.
    InvalidCredentials {
        /// Panel that produced the error.
        panel: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// The authenticated reseller may not act on this account or resource.
    PermissionDenied {
        /// Panel that produced the error.
        panel: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// The hosting account does not exist on the panel.
    AccountNotFound {
        /// Panel that produced the error.
        panel: String,
        /// External account identifier that was not found.
        account: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// The resource does not exist on the panel.
    ResourceNotFound {
        /// Panel that produced the error.
        panel: String,
        /// Kind of the missing resource.
        kind: ResourceKind,
        /// External identifier that was not found.
        external_id: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// A resource with the same natural name already exists on the panel.
    ResourceExists {
        /// Panel that produced the error.
        panel: String,
        /// Kind of the conflicting resource.
        kind: ResourceKind,
        /// Natural name of the conflicting resource.
        name: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// The account's plan quota for this resource kind is exhausted.
    ///
    /// Unlike [`RateLimited`](Self::RateLimited), this is not a transient condition.
    QuotaExceeded {
        /// Panel that produced the error.
        panel: String,
        /// Original error message from the panel API, if available.
        raw_message: Option<String>,
    },

    /// A request parameter was rejected by the panel.
    InvalidParameter {
        /// Panel that produced the error.
        panel: String,
        /// Name of the invalid parameter.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// Failed to parse the panel's API response.
    ParseError {
        /// Panel that produced the error.
        panel: String,
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Panel that produced the error.
        panel: String,
        /// Details about the serialization failure.
        detail: String,
    },

    /// An unrecognized error from the panel API.
    Unknown {
        /// Panel that produced the error.
        panel: String,
        /// Raw error code from the API, if available.
        raw_code: Option<String>,
        /// Raw error message from the API.
        raw_message: String,
    },
}

/// Coarse classification of a [`PanelError`], used by callers that only need
/// to know *what kind* of failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelFailureKind {
    /// The account or resource does not exist on the panel.
    NotFound,
    /// Authentication or authorization failed.
    Auth,
    /// Network, timeout or rate limiting; may succeed later.
    TransientNetwork,
    /// Plan quota exhausted.
    Quota,
    /// The panel rejected or garbled the request for another reason.
    Rejected,
}

impl PanelError {
    /// Classify the error into a [`PanelFailureKind`].
    #[must_use]
    pub fn failure_kind(&self) -> PanelFailureKind {
        match self {
            Self::AccountNotFound { .. } | Self::ResourceNotFound { .. } => {
                PanelFailureKind::NotFound
            }
            Self::InvalidCredentials { .. } | Self::PermissionDenied { .. } => {
                PanelFailureKind::Auth
            }
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => {
                PanelFailureKind::TransientNetwork
            }
            Self::QuotaExceeded { .. } => PanelFailureKind::Quota,
            Self::ResourceExists { .. }
            | Self::InvalidParameter { .. }
            | Self::ParseError { .. }
            | Self::SerializationError { .. }
            | Self::Unknown { .. } => PanelFailureKind::Rejected,
        }
    }

    /// Whether the error is transient and the request may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.failure_kind() == PanelFailureKind::TransientNetwork
    }

    /// Whether it is expected behavior (bad input, missing resource, ...), used for log levels.
    ///
    /// Use `warn` when this returns `true` and `error` when it returns `false`.
    /// **Keep this in sync when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials { .. }
                | Self::PermissionDenied { .. }
                | Self::AccountNotFound { .. }
                | Self::ResourceNotFound { .. }
                | Self::ResourceExists { .. }
                | Self::QuotaExceeded { .. }
                | Self::InvalidParameter { .. }
        )
    }
}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { panel, detail } => {
                write!(f, "[{panel}] Network error: {detail}")
            }
            Self::Timeout { panel, detail } => {
                write!(f, "[{panel}] Request timeout: {detail}")
            }
            Self::RateLimited {
                panel, retry_after, ..
            } => {
                if let Some(secs) = retry_after {
                    write!(f, "[{panel}] Rate limited (retry after {secs}s)")
                } else {
                    write!(f, "[{panel}] Rate limited")
                }
            }
            Self::InvalidCredentials { panel, raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{panel}] Invalid credentials: {msg}")
                } else {
                    write!(f, "[{panel}] Invalid credentials")
                }
            }
            Self::PermissionDenied { panel, raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{panel}] Permission denied: {msg}")
                } else {
                    write!(f, "[{panel}] Permission denied")
                }
            }
            Self::AccountNotFound { panel, account, .. } => {
                write!(f, "[{panel}] Account '{account}' not found")
            }
            Self::ResourceNotFound {
                panel,
                kind,
                external_id,
                ..
            } => {
                write!(f, "[{panel}] {kind} '{external_id}' not found")
            }
            Self::ResourceExists {
                panel, kind, name, ..
            } => {
                write!(f, "[{panel}] {kind} '{name}' already exists")
            }
            Self::QuotaExceeded { panel, raw_message } => {
                if let Some(msg) = raw_message {
                    write!(f, "[{panel}] Quota exceeded: {msg}")
                } else {
                    write!(f, "[{panel}] Quota exceeded")
                }
            }
            Self::InvalidParameter {
                panel,
                param,
                detail,
            } => {
                write!(f, "[{panel}] Invalid parameter '{param}': {detail}")
            }
            Self::ParseError { panel, detail } => {
                write!(f, "[{panel}] Parse error: {detail}")
            }
            Self::SerializationError { panel, detail } => {
                write!(f, "[{panel}] Serialization error: {detail}")
            }
            Self::Unknown {
                panel, raw_message, ..
            } => {
                write!(f, "[{panel}] {raw_message}")
            }
        }
    }
}

impl std::error::Error for PanelError {}

/// Convenience type alias for `Result<T, PanelError>`.
pub type Result<T> = std::result::Result<T, PanelError>;
