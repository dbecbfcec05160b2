//! Panel client factory.

use std::sync::Arc;

use crate::error::{PanelError, Result};
use crate::panels::RestPanelClient;
use crate::traits::HostingPanel;
use crate::types::{PanelCredentials, PanelOptions};

/// Creates a [`HostingPanel`] client from the given credentials.
///
/// Credentials are validated locally first; nothing is sent to the panel.
/// The client is wrapped in `Arc<dyn HostingPanel>` so it can be shared
/// across reconciliation tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use hostsync_panel::{create_panel_client, PanelCredentials, PanelOptions};
///
/// let panel = create_panel_client(
///     PanelCredentials::ApiToken {
///         base_url: "https://panel.example.com/api".to_string(),
///         api_token: "your-token".to_string(),
///     },
///     &PanelOptions::default(),
/// ).unwrap();
/// ```
pub fn create_panel_client(
    credentials: PanelCredentials,
    options: &PanelOptions,
) -> Result<Arc<dyn HostingPanel>> {
    credentials
        .validate()
        .map_err(|e| PanelError::InvalidParameter {
            panel: "factory".to_string(),
            param: "credentials".to_string(),
            detail: e.to_string(),
        })?;

    Ok(Arc::new(RestPanelClient::new(credentials, options)?))
}
