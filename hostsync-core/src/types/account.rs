//! Hosting account types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reseller-managed hosting account, tied one-to-one with an account on a
/// control panel server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostingAccount {
    /// Local identifier
    pub id: i64,
    /// Panel server the account lives on
    pub server_id: i64,
    /// Panel-side account name; set once, never changed afterwards
    pub external_id: Option<String>,
    /// Owning customer
    pub customer_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HostingAccount {
    /// Panel account name, if linked.
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }
}

/// Request to create a hosting account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHostingAccount {
    pub server_id: i64,
    pub customer_id: i64,
    #[serde(default)]
    pub external_id: Option<String>,
}
