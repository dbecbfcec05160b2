//! Reconciliation result types

use std::time::Duration;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use hostsync_panel::{PanelError, PanelFailureKind, ResourceKind};

use super::{ManagedResource, SyncStatus};
use crate::error::CoreError;

// ============ Failures ============

/// Why a single resource failed to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCategory {
    /// The resource or account does not exist on one side
    NotFound,
    /// Network or authentication failure talking to the panel
    RemoteUnavailable,
    /// The panel refused the request (quota, validation, duplicate)
    RemoteRejected,
    /// The local store failed
    LocalWriteFailure,
    /// Identity collision, never resolved automatically
    Conflict,
    /// The payload did not pass local validation
    Validation,
}

impl FailureCategory {
    pub fn from_panel(error: &PanelError) -> Self {
        match error.failure_kind() {
            PanelFailureKind::NotFound => Self::NotFound,
            PanelFailureKind::Auth | PanelFailureKind::TransientNetwork => Self::RemoteUnavailable,
            PanelFailureKind::Quota | PanelFailureKind::Rejected => Self::RemoteRejected,
        }
    }

    pub fn from_core(error: &CoreError) -> Self {
        match error {
            CoreError::Panel(e) => Self::from_panel(e),
            CoreError::RemoteUnavailable(_) => Self::RemoteUnavailable,
            CoreError::Conflict(_) | CoreError::ExternalIdImmutable { .. } => Self::Conflict,
            CoreError::ValidationError(_) => Self::Validation,
            e if e.is_not_found() => Self::NotFound,
            _ => Self::LocalWriteFailure,
        }
    }
}

/// One failed item in a [`SyncResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    /// `None` for failures that are not about one resource (a whole account)
    pub kind: Option<ResourceKind>,
    /// Identity key of the resource, or an account reference
    pub key: String,
    pub category: FailureCategory,
    pub message: String,
}

// ============ Items ============

/// Outcome of one resource in an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
    /// Matched, nothing to write
    Unchanged,
    /// Left alone on purpose (pending change on the other side, or deadline)
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItem {
    pub kind: ResourceKind,
    pub identity_key: String,
    pub external_id: Option<String>,
    pub action: SyncAction,
}

// ============ Sync Result ============

/// Outcome of an import, export or single-resource sync.
///
/// `records_synced` counts matched resources that needed no write; together
/// with `records_created`, `records_updated` and `records_deleted` it adds up
/// to the successful items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub run_id: Uuid,
    pub success: bool,
    pub message: String,
    pub records_synced: usize,
    pub records_created: usize,
    pub records_updated: usize,
    #[serde(default)]
    pub records_deleted: usize,
    pub records_skipped: usize,
    pub records_failed: usize,
    pub errors: Vec<SyncFailure>,
    pub items: Vec<SyncItem>,
    #[serde(rename = "durationMs", with = "duration_ms")]
    pub duration: Duration,
    /// The operation hit its deadline before every item was processed
    #[serde(default)]
    pub cancelled: bool,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ============ Comparison ============

/// Reference to a resource on one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub identity_key: String,
    pub display_name: String,
    /// Local id, `None` for remote-only resources
    pub local_id: Option<i64>,
    pub external_id: Option<String>,
    pub sync_status: SyncStatus,
}

/// One differing field. Values are rendered as strings; `None` means unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDelta {
    pub field: String,
    pub local: Option<String>,
    pub remote: Option<String>,
}

/// A resource present on both sides whose state differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergedResource {
    pub kind: ResourceKind,
    pub identity_key: String,
    pub local_id: i64,
    pub external_id: String,
    pub deltas: Vec<FieldDelta>,
}

/// Non-mutating diff between local records and the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncComparison {
    pub account_id: i64,
    pub local_only: Vec<ResourceRef>,
    pub remote_only: Vec<ResourceRef>,
    pub diverged: Vec<DivergedResource>,
}

impl SyncComparison {
    /// `true` iff nothing is local-only, remote-only or diverged.
    pub fn in_sync(&self) -> bool {
        self.local_only.is_empty() && self.remote_only.is_empty() && self.diverged.is_empty()
    }

    pub fn remote_only_keys(&self) -> Vec<&str> {
        self.remote_only
            .iter()
            .map(|r| r.identity_key.as_str())
            .collect()
    }

    pub fn local_only_keys(&self) -> Vec<&str> {
        self.local_only
            .iter()
            .map(|r| r.identity_key.as_str())
            .collect()
    }

    pub fn diverged_keys(&self) -> Vec<&str> {
        self.diverged
            .iter()
            .map(|r| r.identity_key.as_str())
            .collect()
    }
}

// `inSync` is derived on output, never stored
impl Serialize for SyncComparison {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SyncComparison", 5)?;
        state.serialize_field("accountId", &self.account_id)?;
        state.serialize_field("inSync", &self.in_sync())?;
        state.serialize_field("localOnly", &self.local_only)?;
        state.serialize_field("remoteOnly", &self.remote_only)?;
        state.serialize_field("diverged", &self.diverged)?;
        state.end()
    }
}

// ============ Settings ============

/// Concurrency and deadline settings for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Accounts imported at once by import-all
    #[serde(default = "default_account_concurrency")]
    pub account_concurrency: usize,
    /// Per-resource writes in flight within one account operation
    #[serde(default = "default_resource_concurrency")]
    pub resource_concurrency: usize,
    /// Stop issuing per-resource work after this many seconds
    #[serde(default)]
    pub operation_timeout_secs: Option<u64>,
}

fn default_account_concurrency() -> usize {
    4
}

fn default_resource_concurrency() -> usize {
    1
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            account_concurrency: default_account_concurrency(),
            resource_concurrency: default_resource_concurrency(),
            operation_timeout_secs: None,
        }
    }
}

impl ReconcileSettings {
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }
}

// ============ Single-resource change ============

/// Result of a single-resource create or update: the stored record after
/// the operation, and what happened on the panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceChange {
    pub resource: ManagedResource,
    pub report: SyncResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_in_sync_is_computed() {
        let mut cmp = SyncComparison {
            account_id: 1,
            ..Default::default()
        };
        assert!(cmp.in_sync());

        cmp.remote_only.push(ResourceRef {
            kind: ResourceKind::Domain,
            identity_key: "new.example.com".to_string(),
            display_name: "new.example.com".to_string(),
            local_id: None,
            external_id: Some("d-9".to_string()),
            sync_status: SyncStatus::RemoteOnly,
        });
        assert!(!cmp.in_sync());

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["inSync"], false);
        assert_eq!(json["remoteOnly"][0]["identityKey"], "new.example.com");
    }

    #[test]
    fn settings_defaults_from_empty_toml_like_json() {
        let settings: ReconcileSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ReconcileSettings::default());
        assert_eq!(settings.account_concurrency, 4);
        assert_eq!(settings.resource_concurrency, 1);
        assert!(settings.operation_timeout().is_none());
    }

    #[test]
    fn failure_category_from_panel() {
        let quota = PanelError::QuotaExceeded {
            panel: "rest".into(),
            raw_message: None,
        };
        assert_eq!(
            FailureCategory::from_panel(&quota),
            FailureCategory::RemoteRejected
        );
        let timeout = PanelError::Timeout {
            panel: "rest".into(),
            detail: "30s".into(),
        };
        assert_eq!(
            FailureCategory::from_core(&CoreError::Panel(timeout)),
            FailureCategory::RemoteUnavailable
        );
        assert_eq!(
            FailureCategory::from_core(&CoreError::StorageError("x".into())),
            FailureCategory::LocalWriteFailure
        );
    }

    #[test]
    fn duration_serializes_as_millis() {
        let result = SyncResult {
            run_id: Uuid::nil(),
            success: true,
            message: String::new(),
            records_synced: 0,
            records_created: 0,
            records_updated: 0,
            records_deleted: 0,
            records_skipped: 0,
            records_failed: 0,
            errors: vec![],
            items: vec![],
            duration: Duration::from_millis(1500),
            cancelled: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["durationMs"], 1500);
        assert!(json.get("duration").is_none());
    }
}
