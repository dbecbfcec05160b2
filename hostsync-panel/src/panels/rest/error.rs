//! REST panel error mapping

use crate::error::PanelError;
use crate::traits::{ErrorContext, PanelErrorMapper, RawApiError};

use super::{PANEL_NAME, RestPanelClient};

const UNKNOWN: &str = "<unknown>";

impl PanelErrorMapper for RestPanelClient {
    fn panel_name(&self) -> &'static str {
        PANEL_NAME
    }

    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError {
        let panel = self.panel_name().to_string();
        match raw.code.as_deref() {
            Some("unauthorized" | "invalid_token" | "token_expired" | "http_401") => {
                PanelError::InvalidCredentials {
                    panel,
                    raw_message: Some(raw.message),
                }
            }

            Some("forbidden" | "not_owner" | "http_403") => PanelError::PermissionDenied {
                panel,
                raw_message: Some(raw.message),
            },

            Some("account_not_found" | "account_suspended") => PanelError::AccountNotFound {
                panel,
                account: context.account.unwrap_or_else(|| UNKNOWN.to_string()),
                raw_message: Some(raw.message),
            },

            // A 404 without a resource in scope means the account path itself
            Some("not_found" | "http_404") => match (context.kind, context.external_id) {
                (Some(kind), Some(external_id)) => PanelError::ResourceNotFound {
                    panel,
                    kind,
                    external_id,
                    raw_message: Some(raw.message),
                },
                _ => PanelError::AccountNotFound {
                    panel,
                    account: context.account.unwrap_or_else(|| UNKNOWN.to_string()),
                    raw_message: Some(raw.message),
                },
            },

            Some("already_exists" | "duplicate" | "http_409") => match context.kind {
                Some(kind) => PanelError::ResourceExists {
                    panel,
                    kind,
                    name: context.name.unwrap_or_else(|| UNKNOWN.to_string()),
                    raw_message: Some(raw.message),
                },
                None => self.unknown_error(raw),
            },

            Some("quota_exceeded" | "plan_limit") => PanelError::QuotaExceeded {
                panel,
                raw_message: Some(raw.message),
            },

            Some("rate_limited" | "too_many_requests") => PanelError::RateLimited {
                panel,
                retry_after: None,
                raw_message: Some(raw.message),
            },

            Some("invalid_parameter" | "validation_failed" | "http_422") => {
                PanelError::InvalidParameter {
                    panel,
                    param: context
                        .kind
                        .map_or_else(|| "body".to_string(), |k| k.as_str().to_string()),
                    detail: raw.message,
                }
            }

            _ => self.unknown_error(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PanelCredentials, PanelOptions, ResourceKind};

    fn client() -> RestPanelClient {
        RestPanelClient::new(
            PanelCredentials::ApiToken {
                base_url: "https://panel.test".to_string(),
                api_token: "t".to_string(),
            },
            &PanelOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn maps_auth_codes() {
        let e = client().map_error(
            RawApiError::with_code("invalid_token", "expired"),
            ErrorContext::default(),
        );
        assert!(matches!(e, PanelError::InvalidCredentials { .. }));
    }

    #[test]
    fn not_found_with_resource_context() {
        let ctx = ErrorContext {
            account: Some("bob".to_string()),
            kind: Some(ResourceKind::Mailbox),
            external_id: Some("mb-1".to_string()),
            name: None,
        };
        let e = client().map_error(RawApiError::with_code("not_found", "gone"), ctx);
        assert!(matches!(
            e,
            PanelError::ResourceNotFound { ref external_id, kind: ResourceKind::Mailbox, .. }
                if external_id == "mb-1"
        ));
    }

    #[test]
    fn not_found_without_resource_is_account() {
        let ctx = ErrorContext {
            account: Some("bob".to_string()),
            ..Default::default()
        };
        let e = client().map_error(RawApiError::with_code("http_404", "no"), ctx);
        assert!(matches!(e, PanelError::AccountNotFound { ref account, .. } if account == "bob"));
    }

    #[test]
    fn unrecognized_code_is_unknown() {
        let e = client().map_error(
            RawApiError::with_code("teapot", "short and stout"),
            ErrorContext::default(),
        );
        assert!(matches!(
            e,
            PanelError::Unknown { raw_code: Some(ref c), .. } if c == "teapot"
        ));
    }

    #[test]
    fn missing_code_is_unknown() {
        let e = client().map_error(RawApiError::new("boom"), ErrorContext::default());
        assert!(matches!(e, PanelError::Unknown { raw_code: None, .. }));
    }
}
