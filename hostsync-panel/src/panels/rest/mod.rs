//! Generic REST/JSON hosting panel client
//!
//! Talks to panels exposing one collection per resource kind under an account:
//! `{base}/accounts/{account}/{collection}[/{external_id}]`, wrapped in a
//! `{ success, data, error }` envelope.

mod error;
mod http;
mod panel;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::panels::common::create_http_client;
use crate::types::{PanelCredentials, PanelOptions, ResourceKind};

pub(crate) use types::{ApiEnvelope, WhoAmI};

pub(crate) const PANEL_NAME: &str = "rest";

/// Collection path segment for a resource kind.
pub(crate) fn collection(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Domain => "domains",
        ResourceKind::Database => "databases",
        ResourceKind::DatabaseUser => "database-users",
        ResourceKind::Mailbox => "mailboxes",
        ResourceKind::FtpAccount => "ftp-accounts",
    }
}

pub(crate) enum RestAuth {
    Bearer(String),
    Basic { username: String, password: String },
}

/// REST/JSON hosting panel client
pub struct RestPanelClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) auth: RestAuth,
    pub(crate) max_retries: u32,
}

impl RestPanelClient {
    /// Build a client from reseller credentials and transport options.
    pub fn new(credentials: PanelCredentials, options: &PanelOptions) -> Result<Self> {
        let client = create_http_client(PANEL_NAME, options)?;
        let (base_url, auth) = match credentials {
            PanelCredentials::ApiToken {
                base_url,
                api_token,
            } => (base_url, RestAuth::Bearer(api_token)),
            PanelCredentials::BasicAuth {
                base_url,
                username,
                password,
            } => (base_url, RestAuth::Basic { username, password }),
        };

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            max_retries: options.max_retries,
        })
    }
}
