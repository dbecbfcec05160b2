//! Managed resource types
//!
//! The local side of reconciliation: every domain, database, database user,
//! mailbox and FTP account the reseller manages, with its link to the panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostsync_panel::ResourceKind;

// ============ Payloads ============

/// Local record of a web domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPayload {
    pub name: String,
    #[serde(default)]
    pub document_root: Option<String>,
    #[serde(default)]
    pub php_version: Option<String>,
    #[serde(default)]
    pub ssl_enabled: bool,
}

/// Local record of a database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabasePayload {
    pub name: String,
    #[serde(default)]
    pub charset: Option<String>,
}

/// Local record of a database login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUserPayload {
    pub username: String,
    #[serde(default = "default_db_host")]
    pub host: String,
    /// Databases the login is granted on
    #[serde(default)]
    pub databases: Vec<String>,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

/// Local record of a mailbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxPayload {
    pub address: String,
    #[serde(default)]
    pub quota_mb: Option<u64>,
    #[serde(default)]
    pub suspended: bool,
}

/// Local record of an FTP login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FtpAccountPayload {
    pub username: String,
    pub home_dir: String,
    #[serde(default)]
    pub quota_mb: Option<u64>,
}

/// Kind-specific payload of a [`ManagedResource`].
///
/// Serialized with a `"kind"` tag, e.g. `{"kind":"mailbox","address":"a@x.com"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ResourcePayload {
    Domain(DomainPayload),
    Database(DatabasePayload),
    DatabaseUser(DatabaseUserPayload),
    Mailbox(MailboxPayload),
    FtpAccount(FtpAccountPayload),
}

impl ResourcePayload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Domain(_) => ResourceKind::Domain,
            Self::Database(_) => ResourceKind::Database,
            Self::DatabaseUser(_) => ResourceKind::DatabaseUser,
            Self::Mailbox(_) => ResourceKind::Mailbox,
            Self::FtpAccount(_) => ResourceKind::FtpAccount,
        }
    }

    /// Natural name as entered (not normalized).
    pub fn display_name(&self) -> &str {
        match self {
            Self::Domain(d) => &d.name,
            Self::Database(d) => &d.name,
            Self::DatabaseUser(u) => &u.username,
            Self::Mailbox(m) => &m.address,
            Self::FtpAccount(f) => &f.username,
        }
    }
}

// ============ Sync Status ============

/// Relationship between a local record and its panel counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Linked and equal at the last sync
    InSync,
    /// Not linked to a panel resource yet
    LocalOnly,
    /// Exists only on the panel (comparison references only)
    RemoteOnly,
    /// Linked, but local and panel state differ
    Diverged,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InSync => "in-sync",
            Self::LocalOnly => "local-only",
            Self::RemoteOnly => "remote-only",
            Self::Diverged => "diverged",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-sync" => Some(Self::InSync),
            "local-only" => Some(Self::LocalOnly),
            "remote-only" => Some(Self::RemoteOnly),
            "diverged" => Some(Self::Diverged),
            _ => None,
        }
    }
}

// ============ Managed Resource ============

/// A locally managed hosting resource.
///
/// `external_id` is `None` until the resource is first linked to the panel,
/// and is never cleared afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedResource {
    pub id: i64,
    pub account_id: i64,
    pub kind: ResourceKind,
    pub external_id: Option<String>,
    /// Normalized natural key used to pair unlinked records
    pub identity_key: String,
    pub payload: ResourcePayload,
    pub sync_status: SyncStatus,
    /// Fingerprint of the payload both sides agreed on at the last sync
    pub sync_fingerprint: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ManagedResource {
    pub fn is_linked(&self) -> bool {
        self.external_id.is_some()
    }
}

/// A resource about to be inserted; the store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewManagedResource {
    pub account_id: i64,
    pub external_id: Option<String>,
    pub identity_key: String,
    pub payload: ResourcePayload,
    pub sync_status: SyncStatus,
    pub sync_fingerprint: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl NewManagedResource {
    pub fn kind(&self) -> ResourceKind {
        self.payload.kind()
    }
}
