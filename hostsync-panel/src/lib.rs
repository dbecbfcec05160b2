//! # hostsync-panel
//!
//! Client boundary for hosting control panels reached through a reseller login.
//!
//! A panel exposes, per hosting account, five resource kinds: domains,
//! databases, database users, mailboxes and FTP accounts. Each is addressed by
//! a panel-assigned external identifier. There is no batch or transaction
//! primitive; every call succeeds or fails on its own.
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)*: Use rustls for TLS.
//! - **`native-tls`**: Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hostsync_panel::{
//!     create_panel_client, HostingPanel, PanelCredentials, PanelOptions, ResourceKind,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let panel = create_panel_client(
//!         PanelCredentials::ApiToken {
//!             base_url: "https://panel.example.com/api".to_string(),
//!             api_token: "your-token".to_string(),
//!         },
//!         &PanelOptions::default(),
//!     )?;
//!
//!     panel.validate_credentials().await?;
//!
//!     for mailbox in panel.list_resources("alice", ResourceKind::Mailbox).await? {
//!         println!("{} -> {}", mailbox.external_id, mailbox.data.display_name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result<T, PanelError>`](PanelError).
//! [`PanelError::failure_kind`] collapses the variants into the coarse classes
//! callers branch on: not found, auth, transient network, quota, rejected.
//!
//! Transient failures are retried only when
//! [`PanelOptions::max_retries`] is non-zero.

mod error;
mod factory;
mod http_client;
mod panels;
mod traits;
mod types;
mod utils;

pub use error::{PanelError, PanelFailureKind, Result};

pub use factory::create_panel_client;

// Internal mapping traits stay private
pub use traits::HostingPanel;

pub use types::{
    CredentialValidationError, PanelCredentials, PanelDatabase, PanelDatabaseUser, PanelDomain,
    PanelFtpAccount, PanelMailbox, PanelOptions, RemoteResource, RemoteResourceData,
    ResourceKind,
};

pub use panels::RestPanelClient;

pub use utils::log_sanitizer::truncate_for_log;
