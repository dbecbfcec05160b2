//! Single-resource create, update and delete
//!
//! The local write always lands first. Propagation to the panel is best
//! effort: a remote failure is reported in the returned [`SyncResult`] and
//! never undoes the local change.

use std::sync::Arc;

use hostsync_panel::{PanelError, ResourceKind};

use super::reconciliation::{Executor, LocalEntry, Task};
use super::report::{ItemOutcome, SyncReportBuilder};
use super::ServiceContext;
use crate::error::{CoreError, CoreResult};
use crate::mappers::mapper_for;
use crate::types::{
    FailureCategory, ManagedResource, NewManagedResource, ResourceChange, ResourcePayload,
    SyncAction, SyncResult, SyncStatus,
};
use crate::utils::fingerprint::payload_fingerprint;

/// Managed resource CRUD with optional panel propagation
pub struct ResourceService {
    ctx: Arc<ServiceContext>,
}

impl ResourceService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_resource(&self, resource_id: i64) -> CoreResult<ManagedResource> {
        self.ctx
            .resource_repository
            .find_by_id(resource_id)
            .await?
            .ok_or(CoreError::ResourceNotFound(resource_id))
    }

    /// Resources of an account, optionally one kind only
    pub async fn list_resources(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
    ) -> CoreResult<Vec<ManagedResource>> {
        self.ctx.get_account(account_id).await?;
        self.ctx
            .resource_repository
            .list_by_account(account_id, kind)
            .await
    }

    /// Create a local record, then the panel resource when `sync_to_server`.
    ///
    /// If the panel create fails the record stays `LocalOnly` and the next
    /// export retries it.
    pub async fn create_resource(
        &self,
        account_id: i64,
        payload: ResourcePayload,
        sync_to_server: bool,
    ) -> CoreResult<ResourceChange> {
        let _guard = self.ctx.lock_account(account_id).await;
        self.ctx.get_account(account_id).await?;

        let mapper = mapper_for(payload.kind());
        mapper.validate(&payload)?;
        let identity_key = mapper.identity_key(&payload)?;

        let same_key = self
            .ctx
            .resource_repository
            .find_by_identity_key(account_id, payload.kind(), &identity_key)
            .await?;
        if !same_key.is_empty() {
            log::warn!(
                "{} '{identity_key}' already has {} record(s) on hosting account {account_id}; \
                 sync will not pair it automatically",
                payload.kind(),
                same_key.len()
            );
        }

        let record = self
            .ctx
            .resource_repository
            .create(&NewManagedResource {
                account_id,
                external_id: None,
                identity_key,
                payload,
                sync_status: SyncStatus::LocalOnly,
                sync_fingerprint: None,
                last_synced_at: None,
            })
            .await?;
        log::info!(
            "Created {} '{}' (id {}) for hosting account {account_id}",
            record.kind,
            record.identity_key,
            record.id
        );

        self.finish_change(record, sync_to_server, "Create").await
    }

    /// Replace a record's payload, then push it when `sync_to_server`.
    ///
    /// A linked record edited without sync becomes `Diverged`. An unlinked
    /// record synced here gets its first panel create.
    pub async fn update_resource(
        &self,
        resource_id: i64,
        payload: ResourcePayload,
        sync_to_server: bool,
    ) -> CoreResult<ResourceChange> {
        let account_id = self.get_resource(resource_id).await?.account_id;
        let _guard = self.ctx.lock_account(account_id).await;
        let mut record = self.get_resource(resource_id).await?;

        if payload.kind() != record.kind {
            return Err(CoreError::ValidationError(format!(
                "cannot change resource {resource_id} from {} to {}",
                record.kind,
                payload.kind()
            )));
        }
        let mapper = mapper_for(record.kind);
        mapper.validate(&payload)?;

        record.identity_key = mapper.identity_key(&payload)?;
        record.payload = payload;
        let fingerprint = payload_fingerprint(&record.payload)?;
        if record.is_linked() && record.sync_fingerprint.as_deref() != Some(fingerprint.as_str()) {
            record.sync_status = SyncStatus::Diverged;
        }
        self.ctx.resource_repository.update(&record).await?;
        log::info!(
            "Updated {} '{}' (id {resource_id}), status {}",
            record.kind,
            record.identity_key,
            record.sync_status.as_str()
        );

        self.finish_change(record, sync_to_server, "Update").await
    }

    /// Delete a record, and its panel resource when `delete_from_server`.
    ///
    /// A record that was never linked has nothing to delete remotely. A panel
    /// resource that is already gone counts as deleted.
    pub async fn delete_resource(
        &self,
        resource_id: i64,
        delete_from_server: bool,
    ) -> CoreResult<SyncResult> {
        let account_id = self.get_resource(resource_id).await?.account_id;
        let _guard = self.ctx.lock_account(account_id).await;
        let record = self.get_resource(resource_id).await?;

        self.ctx.resource_repository.delete(resource_id).await?;
        log::info!(
            "Deleted {} '{}' (id {resource_id}) locally",
            record.kind,
            record.identity_key
        );

        let mut report = SyncReportBuilder::new("Delete");
        let outcome = match (delete_from_server, record.external_id.as_deref()) {
            (true, Some(external_id)) => self.delete_remote(&record, external_id).await,
            _ => ItemOutcome::ok(
                record.kind,
                &record.identity_key,
                record.external_id.as_deref(),
                SyncAction::Deleted,
            ),
        };
        report.record(outcome);
        Ok(report.finish())
    }

    async fn delete_remote(&self, record: &ManagedResource, external_id: &str) -> ItemOutcome {
        let deleted = match self.ctx.linked_account(record.account_id).await {
            Ok((_, account, panel)) => panel
                .delete_resource(&account, record.kind, external_id)
                .await
                .map_err(CoreError::from),
            Err(e) => Err(e),
        };

        match deleted {
            Ok(()) => ItemOutcome::ok(
                record.kind,
                &record.identity_key,
                Some(external_id),
                SyncAction::Deleted,
            ),
            Err(CoreError::Panel(PanelError::ResourceNotFound { .. })) => {
                log::debug!("{} '{external_id}' already gone from the panel", record.kind);
                ItemOutcome::ok(
                    record.kind,
                    &record.identity_key,
                    Some(external_id),
                    SyncAction::Deleted,
                )
            }
            Err(e) => {
                log::warn!(
                    "Remote delete of {} '{external_id}' failed: {e}",
                    record.kind
                );
                ItemOutcome::failed(
                    record.kind,
                    &record.identity_key,
                    Some(external_id),
                    FailureCategory::from_core(&e),
                    e.to_string(),
                )
            }
        }
    }

    async fn finish_change(
        &self,
        record: ManagedResource,
        sync_to_server: bool,
        operation: &'static str,
    ) -> CoreResult<ResourceChange> {
        let mut report = SyncReportBuilder::new(operation);
        if !sync_to_server {
            return Ok(ResourceChange {
                resource: record,
                report: report.finish(),
            });
        }

        let resource_id = record.id;
        report.record(self.propagate(record).await);
        let resource = self.get_resource(resource_id).await?;
        Ok(ResourceChange {
            resource,
            report: report.finish(),
        })
    }

    /// Push one record to the panel: update when linked, create otherwise.
    async fn propagate(&self, record: ManagedResource) -> ItemOutcome {
        let (kind, key) = (record.kind, record.identity_key.clone());
        let external_id = record.external_id.clone();
        let fail = |e: &CoreError| {
            log::warn!("Cannot sync {kind} '{key}': {e}");
            ItemOutcome::failed(
                kind,
                &key,
                external_id.as_deref(),
                FailureCategory::from_core(e),
                e.to_string(),
            )
        };

        let (_, account, panel) = match self.ctx.linked_account(record.account_id).await {
            Ok(target) => target,
            Err(e) => return fail(&e),
        };
        let account_id = record.account_id;
        let local = match LocalEntry::new(record) {
            Ok(local) => local,
            Err(e) => return fail(&e),
        };
        let task = match local.external_id() {
            Some(id) => Task::PushUpdate {
                external_id: id.to_string(),
                local,
            },
            None => Task::CreateRemote { local },
        };

        Executor {
            ctx: &self.ctx,
            panel,
            account_id,
            account: &account,
            kind,
            deadline: None,
        }
        .run(task)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use hostsync_panel::HostingPanel;

    use crate::test_utils::{database, ftp, mailbox, TestHarness};

    #[tokio::test]
    async fn create_without_sync_stays_local() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;

        let change = h
            .resource_service()
            .create_resource(42, mailbox("Info@Example.com", None), false)
            .await
            .unwrap();

        assert_eq!(change.resource.identity_key, "info@example.com");
        assert_eq!(change.resource.sync_status, SyncStatus::LocalOnly);
        assert!(change.report.items.is_empty());
        assert_eq!(h.panel.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_with_sync_links_record() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;

        let change = h
            .resource_service()
            .create_resource(42, database("shop"), true)
            .await
            .unwrap();

        assert!(change.report.success);
        assert_eq!(change.report.records_created, 1);
        let external_id = change.resource.external_id.clone().unwrap();
        assert_eq!(change.resource.sync_status, SyncStatus::InSync);
        assert!(h.panel.find("acct42", &external_id).await.is_some());
    }

    #[tokio::test]
    async fn remote_create_failure_keeps_local_record() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        h.panel.reject("deploy").await;

        let change = h
            .resource_service()
            .create_resource(42, ftp("deploy", "/public_html"), true)
            .await
            .unwrap();

        assert!(change.report.success);
        assert_eq!(change.report.records_failed, 1);
        assert_eq!(change.report.errors[0].category, FailureCategory::RemoteRejected);
        assert_eq!(change.resource.external_id, None);
        assert_eq!(change.resource.sync_status, SyncStatus::LocalOnly);
        assert_eq!(h.resources.all().await.len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;

        let err = h
            .resource_service()
            .create_resource(42, mailbox("not-an-address", None), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)), "{err:?}");
        assert!(h.resources.all().await.is_empty());
    }

    #[tokio::test]
    async fn sync_on_unlinked_account_is_reported() {
        let h = TestHarness::new().await;
        h.add_account(5, None).await;

        let change = h
            .resource_service()
            .create_resource(5, database("shop"), true)
            .await
            .unwrap();

        assert_eq!(change.report.records_failed, 1);
        assert_eq!(change.report.errors[0].category, FailureCategory::NotFound);
        assert_eq!(change.resource.sync_status, SyncStatus::LocalOnly);
    }

    #[tokio::test]
    async fn local_edit_of_linked_record_diverges() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let service = h.resource_service();
        let created = service
            .create_resource(42, mailbox("a@x.com", Some(100)), true)
            .await
            .unwrap()
            .resource;

        let change = service
            .update_resource(created.id, mailbox("a@x.com", Some(500)), false)
            .await
            .unwrap();
        assert_eq!(change.resource.sync_status, SyncStatus::Diverged);

        let change = service
            .update_resource(created.id, mailbox("a@x.com", Some(500)), true)
            .await
            .unwrap();
        assert_eq!(change.resource.sync_status, SyncStatus::InSync);
        assert_eq!(change.report.records_updated, 1);
        assert_eq!(h.panel.updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_push_leaves_record_diverged() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let service = h.resource_service();
        let created = service
            .create_resource(42, database("shop"), true)
            .await
            .unwrap()
            .resource;
        h.panel.reject("shop_v2").await;

        let change = service
            .update_resource(created.id, database("shop_v2"), true)
            .await
            .unwrap();

        assert_eq!(change.report.records_failed, 1);
        assert_eq!(change.resource.sync_status, SyncStatus::Diverged);
        assert_eq!(change.resource.identity_key, "shop_v2");
    }

    #[tokio::test]
    async fn update_cannot_change_kind() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let record = h.add_local(42, database("shop")).await;

        let err = h
            .resource_service()
            .update_resource(record.id, mailbox("a@x.com", None), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)), "{err:?}");
    }

    #[tokio::test]
    async fn update_unlinked_with_sync_creates_remote() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let record = h.add_local(42, database("shop")).await;

        let change = h
            .resource_service()
            .update_resource(record.id, database("shop"), true)
            .await
            .unwrap();
        assert_eq!(change.report.records_created, 1);
        assert!(change.resource.is_linked());
    }

    #[tokio::test]
    async fn delete_unlinked_from_server_is_noop() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let record = h.add_local(42, database("shop")).await;

        let result = h
            .resource_service()
            .delete_resource(record.id, true)
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.records_deleted, 1);
        assert!(result.errors.is_empty());
        assert_eq!(h.panel.deletes.load(Ordering::SeqCst), 0);
        assert!(h.resources.get(record.id).await.is_none());
    }

    #[tokio::test]
    async fn delete_tolerates_missing_remote() {
        let h = TestHarness::new().await;
        h.add_account(42, Some("acct42")).await;
        let service = h.resource_service();
        let created = service
            .create_resource(42, database("shop"), true)
            .await
            .unwrap()
            .resource;
        let external_id = created.external_id.as_deref().unwrap();
        h.panel
            .delete_resource("acct42", ResourceKind::Database, external_id)
            .await
            .unwrap();

        let result = service.delete_resource(created.id, true).await.unwrap();
        assert!(result.success);
        assert_eq!(result.records_deleted, 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_resource_is_not_found() {
        let h = TestHarness::new().await;
        let err = h
            .resource_service()
            .delete_resource(999, false)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ResourceNotFound(999)));
    }
}
