//! Shared helpers for panel clients

use std::time::Duration;

use reqwest::Client;

use crate::error::{PanelError, Result};
use crate::types::PanelOptions;

/// Build an HTTP client with the configured timeouts.
pub fn create_http_client(panel: &str, options: &PanelOptions) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(options.connect_timeout_secs))
        .timeout(Duration::from_secs(options.timeout_secs))
        .build()
        .map_err(|e| PanelError::NetworkError {
            panel: panel.to_string(),
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// Join a base URL and path segments, percent-encoding each segment.
///
/// `join_url("https://p/api/", &["accounts", "bob smith"])` gives
/// `https://p/api/accounts/bob%20smith`.
pub fn join_url(base_url: &str, segments: &[&str]) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();
    for segment in segments {
        url.push('/');
        url.push_str(&urlencoding::encode(segment));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_trims_base_slash() {
        assert_eq!(
            join_url("https://panel.test/api/", &["accounts", "alice"]),
            "https://panel.test/api/accounts/alice"
        );
    }

    #[test]
    fn join_url_encodes_segments() {
        assert_eq!(
            join_url("https://panel.test", &["accounts", "a/b", "mailboxes", "x@y.com"]),
            "https://panel.test/accounts/a%2Fb/mailboxes/x%40y.com"
        );
    }

    #[test]
    fn client_builds_with_defaults() {
        assert!(create_http_client("rest", &PanelOptions::default()).is_ok());
    }
}
