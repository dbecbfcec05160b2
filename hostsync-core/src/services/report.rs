//! Sync report builder
//!
//! Collects per-item outcomes into a [`SyncResult`].

use std::time::Instant;

use uuid::Uuid;

use crate::error::CoreError;
use crate::types::{
    FailureCategory, ResourceKind, SyncAction, SyncFailure, SyncItem, SyncResult,
};

/// Outcome of one planned or executed item.
#[derive(Debug, Clone)]
pub(crate) struct ItemOutcome {
    pub item: SyncItem,
    pub failure: Option<SyncFailure>,
    /// Not attempted because the deadline passed
    pub cancelled: bool,
}

impl ItemOutcome {
    pub fn ok(
        kind: ResourceKind,
        identity_key: &str,
        external_id: Option<&str>,
        action: SyncAction,
    ) -> Self {
        Self {
            item: SyncItem {
                kind,
                identity_key: identity_key.to_string(),
                external_id: external_id.map(ToString::to_string),
                action,
            },
            failure: None,
            cancelled: false,
        }
    }

    pub fn failed(
        kind: ResourceKind,
        identity_key: &str,
        external_id: Option<&str>,
        category: FailureCategory,
        message: impl Into<String>,
    ) -> Self {
        let mut outcome = Self::ok(kind, identity_key, external_id, SyncAction::Failed);
        outcome.failure = Some(SyncFailure {
            kind: Some(kind),
            key: identity_key.to_string(),
            category,
            message: message.into(),
        });
        outcome
    }

    pub fn cancelled(kind: ResourceKind, identity_key: &str, external_id: Option<&str>) -> Self {
        let mut outcome = Self::ok(kind, identity_key, external_id, SyncAction::Skipped);
        outcome.cancelled = true;
        outcome
    }
}

/// Aggregates outcomes for one operation (or one batch of accounts).
pub struct SyncReportBuilder {
    operation: &'static str,
    run_id: Uuid,
    started: Instant,
    synced: usize,
    created: usize,
    updated: usize,
    deleted: usize,
    skipped: usize,
    failed: usize,
    errors: Vec<SyncFailure>,
    items: Vec<SyncItem>,
    cancelled: bool,
    failed_accounts: usize,
}

impl SyncReportBuilder {
    /// `operation` names the run in the result message ("Import", "Export", ...).
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            run_id: Uuid::new_v4(),
            started: Instant::now(),
            synced: 0,
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            items: Vec::new(),
            cancelled: false,
            failed_accounts: 0,
        }
    }

    pub(crate) fn record(&mut self, outcome: ItemOutcome) {
        match outcome.item.action {
            SyncAction::Created => self.created += 1,
            SyncAction::Updated => self.updated += 1,
            SyncAction::Deleted => self.deleted += 1,
            SyncAction::Unchanged => self.synced += 1,
            SyncAction::Skipped => self.skipped += 1,
            SyncAction::Failed => self.failed += 1,
        }
        self.cancelled |= outcome.cancelled;
        if let Some(failure) = outcome.failure {
            self.errors.push(failure);
        }
        self.items.push(outcome.item);
    }

    pub(crate) fn extend(&mut self, outcomes: impl IntoIterator<Item = ItemOutcome>) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }

    /// Add one account's result to a batch report.
    pub fn merge_account(&mut self, account_id: i64, result: SyncResult) {
        self.synced += result.records_synced;
        self.created += result.records_created;
        self.updated += result.records_updated;
        self.deleted += result.records_deleted;
        self.skipped += result.records_skipped;
        self.failed += result.records_failed;
        self.cancelled |= result.cancelled;
        self.items.extend(result.items);
        self.errors
            .extend(result.errors.into_iter().map(|mut failure| {
                failure.message = format!("[account {account_id}] {}", failure.message);
                failure
            }));
        if !result.success && !result.cancelled {
            self.failed_accounts += 1;
        }
    }

    /// Record an account that could not be processed at all.
    pub fn account_failure(&mut self, account_id: i64, error: &CoreError) {
        self.failed_accounts += 1;
        self.errors.push(SyncFailure {
            kind: None,
            key: format!("account:{account_id}"),
            category: FailureCategory::from_core(error),
            message: format!("[account {account_id}] {error}"),
        });
    }

    fn summary(&self) -> String {
        format!(
            "{} created, {} updated, {} deleted, {} unchanged, {} skipped, {} failed",
            self.created, self.updated, self.deleted, self.synced, self.skipped, self.failed
        )
    }

    /// Result for an operation that failed before any write.
    pub fn abort(self, error: &CoreError) -> SyncResult {
        let message = format!("{} aborted: {error}", self.operation);
        SyncResult {
            run_id: self.run_id,
            success: false,
            message,
            records_synced: 0,
            records_created: 0,
            records_updated: 0,
            records_deleted: 0,
            records_skipped: 0,
            records_failed: 0,
            errors: vec![SyncFailure {
                kind: None,
                key: "operation".to_string(),
                category: FailureCategory::from_core(error),
                message: error.to_string(),
            }],
            items: Vec::new(),
            duration: self.started.elapsed(),
            cancelled: false,
        }
    }

    pub fn finish(self) -> SyncResult {
        let summary = self.summary();
        let message = if self.cancelled {
            format!("{} cancelled at deadline: {summary}", self.operation)
        } else if self.failed_accounts > 0 {
            format!(
                "{} finished with {} failed account(s): {summary}",
                self.operation, self.failed_accounts
            )
        } else {
            format!("{} completed: {summary}", self.operation)
        };

        SyncResult {
            run_id: self.run_id,
            success: !self.cancelled && self.failed_accounts == 0,
            message,
            records_synced: self.synced,
            records_created: self.created,
            records_updated: self.updated,
            records_deleted: self.deleted,
            records_skipped: self.skipped,
            records_failed: self.failed,
            errors: self.errors,
            items: self.items,
            duration: self.started.elapsed(),
            cancelled: self.cancelled,
        }
    }
}
