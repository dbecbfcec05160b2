//! Runs planned tasks against the local store and the panel

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use hostsync_panel::{HostingPanel, ResourceKind};
use tokio::time::Instant;

use super::decision::Task;
use super::pairing::{LocalEntry, RemoteEntry};
use crate::error::{CoreError, CoreResult};
use crate::mappers::mapper_for;
use crate::services::report::ItemOutcome;
use crate::services::ServiceContext;
use crate::types::{FailureCategory, ManagedResource, NewManagedResource, SyncAction, SyncStatus};

pub(crate) struct Executor<'a> {
    pub ctx: &'a ServiceContext,
    pub panel: Arc<dyn HostingPanel>,
    pub account_id: i64,
    /// Panel account name
    pub account: &'a str,
    pub kind: ResourceKind,
    pub deadline: Option<Instant>,
}

impl Executor<'_> {
    /// Run tasks with bounded concurrency. Tasks not started by the deadline
    /// come back as cancelled skips.
    pub async fn run_all(&self, tasks: Vec<Task>) -> Vec<ItemOutcome> {
        let limit = self.ctx.settings.resource_concurrency.max(1);
        stream::iter(tasks)
            .map(|task| async move {
                if self.deadline.is_some_and(|d| Instant::now() >= d) {
                    return task.cancelled(self.kind);
                }
                self.run(task).await
            })
            .buffer_unordered(limit)
            .collect()
            .await
    }

    pub(crate) async fn run(&self, task: Task) -> ItemOutcome {
        match task {
            Task::MarkInSync { local, remote } => self.mark_in_sync(local, &remote).await,
            Task::Pull { local, remote } => self.pull(local, &remote).await,
            Task::CreateLocal { remote } => self.create_local(&remote).await,
            Task::PushUpdate { local, external_id } => {
                self.push_update(local, &external_id).await
            }
            Task::LinkRemote {
                local,
                remote,
                push,
            } => self.link_remote(local, &remote, push).await,
            Task::CreateRemote { local } => self.create_remote(local).await,
            Task::MarkMissing { local } => self.mark_missing(local).await,
        }
    }

    fn failed(&self, key: &str, external_id: Option<&str>, error: &CoreError) -> ItemOutcome {
        if error.is_expected() {
            log::warn!("{} '{key}' failed: {error}", self.kind);
        } else {
            log::error!("{} '{key}' failed: {error}", self.kind);
        }
        ItemOutcome::failed(
            self.kind,
            key,
            external_id,
            FailureCategory::from_core(error),
            error.to_string(),
        )
    }

    async fn save(&self, record: &ManagedResource, action: SyncAction) -> ItemOutcome {
        let external_id = record.external_id.as_deref();
        match self.ctx.resource_repository.update(record).await {
            Ok(()) => ItemOutcome::ok(self.kind, &record.identity_key, external_id, action),
            Err(e) => self.failed(&record.identity_key, external_id, &e),
        }
    }

    /// Fails with a conflict when a record other than `record_id` already
    /// holds `external_id`. The snapshot may be stale by the time a task runs.
    async fn ensure_link_free(&self, record_id: Option<i64>, external_id: &str) -> CoreResult<()> {
        let holder = self
            .ctx
            .resource_repository
            .find_by_external_id(self.account_id, self.kind, external_id)
            .await?;
        match holder {
            Some(holder) if Some(holder.id) != record_id => Err(CoreError::Conflict(format!(
                "panel resource '{external_id}' is already linked to local record {}",
                holder.id
            ))),
            _ => Ok(()),
        }
    }

    async fn mark_in_sync(&self, local: LocalEntry, remote: &RemoteEntry) -> ItemOutcome {
        let mut record = local.record;
        record.sync_status = SyncStatus::InSync;
        record.sync_fingerprint = Some(remote.fingerprint.clone());
        record.last_synced_at = Some(Utc::now());
        self.save(&record, SyncAction::Updated).await
    }

    async fn pull(&self, local: LocalEntry, remote: &RemoteEntry) -> ItemOutcome {
        let mut record = local.record;
        if !record.is_linked() {
            if let Err(e) = self.ensure_link_free(Some(record.id), &remote.external_id).await {
                return self.failed(&remote.identity_key, Some(&remote.external_id), &e);
            }
        }
        record.external_id = Some(remote.external_id.clone());
        record.identity_key.clone_from(&remote.identity_key);
        record.payload = remote.payload.clone();
        record.sync_status = SyncStatus::InSync;
        record.sync_fingerprint = Some(remote.fingerprint.clone());
        record.last_synced_at = Some(Utc::now());
        self.save(&record, SyncAction::Updated).await
    }

    async fn create_local(&self, remote: &RemoteEntry) -> ItemOutcome {
        if let Err(e) = self.ensure_link_free(None, &remote.external_id).await {
            return self.failed(&remote.identity_key, Some(&remote.external_id), &e);
        }
        let new = NewManagedResource {
            account_id: self.account_id,
            external_id: Some(remote.external_id.clone()),
            identity_key: remote.identity_key.clone(),
            payload: remote.payload.clone(),
            sync_status: SyncStatus::InSync,
            sync_fingerprint: Some(remote.fingerprint.clone()),
            last_synced_at: Some(Utc::now()),
        };
        match self.ctx.resource_repository.create(&new).await {
            Ok(_) => ItemOutcome::ok(
                self.kind,
                &remote.identity_key,
                Some(&remote.external_id),
                SyncAction::Created,
            ),
            Err(e) => self.failed(&remote.identity_key, Some(&remote.external_id), &e),
        }
    }

    /// Leave a marker so the next run sees the pending local edit.
    async fn mark_diverged(&self, record: &mut ManagedResource) {
        if record.sync_status == SyncStatus::Diverged {
            return;
        }
        record.sync_status = SyncStatus::Diverged;
        if let Err(e) = self.ctx.resource_repository.update(record).await {
            log::warn!(
                "{} '{}': failed to mark diverged: {e}",
                self.kind,
                record.identity_key
            );
        }
    }

    async fn push_update(&self, local: LocalEntry, external_id: &str) -> ItemOutcome {
        let mut record = local.record;
        let key = record.identity_key.clone();

        let pushed = match mapper_for(self.kind).to_remote(&record.payload) {
            Ok(data) => self
                .panel
                .update_resource(self.account, external_id, &data)
                .await
                .map_err(CoreError::from),
            Err(e) => Err(e),
        };

        match pushed {
            Ok(_) => {
                record.sync_status = SyncStatus::InSync;
                record.sync_fingerprint = Some(local.fingerprint);
                record.last_synced_at = Some(Utc::now());
                self.save(&record, SyncAction::Updated).await
            }
            Err(e) => {
                self.mark_diverged(&mut record).await;
                self.failed(&key, Some(external_id), &e)
            }
        }
    }

    async fn link_remote(
        &self,
        local: LocalEntry,
        remote: &RemoteEntry,
        push: bool,
    ) -> ItemOutcome {
        let mut record = local.record;
        if let Err(e) = self.ensure_link_free(Some(record.id), &remote.external_id).await {
            return self.failed(&record.identity_key, Some(&remote.external_id), &e);
        }
        record.external_id = Some(remote.external_id.clone());

        if !push {
            record.sync_status = SyncStatus::InSync;
            record.sync_fingerprint = Some(remote.fingerprint.clone());
            record.last_synced_at = Some(Utc::now());
            return self.save(&record, SyncAction::Updated).await;
        }

        let pushed = match mapper_for(self.kind).to_remote(&record.payload) {
            Ok(data) => self
                .panel
                .update_resource(self.account, &remote.external_id, &data)
                .await
                .map_err(CoreError::from),
            Err(e) => Err(e),
        };

        match pushed {
            Ok(_) => {
                record.sync_status = SyncStatus::InSync;
                record.sync_fingerprint = Some(local.fingerprint);
                record.last_synced_at = Some(Utc::now());
                self.save(&record, SyncAction::Updated).await
            }
            Err(e) => {
                // Keep the link; the baseline is the panel state so the
                // local edit stays pending.
                record.sync_status = SyncStatus::Diverged;
                record.sync_fingerprint = Some(remote.fingerprint.clone());
                if let Err(save_err) = self.ctx.resource_repository.update(&record).await {
                    log::warn!(
                        "{} '{}': failed to record link: {save_err}",
                        self.kind,
                        record.identity_key
                    );
                }
                self.failed(&record.identity_key, Some(&remote.external_id), &e)
            }
        }
    }

    async fn create_remote(&self, local: LocalEntry) -> ItemOutcome {
        let mut record = local.record;
        let mapper = mapper_for(self.kind);

        let data = match mapper
            .validate(&record.payload)
            .and_then(|()| mapper.to_remote(&record.payload))
        {
            Ok(data) => data,
            Err(e) => return self.failed(&record.identity_key, None, &e),
        };

        let created = match self.panel.create_resource(self.account, &data).await {
            Ok(created) => created,
            Err(e) => return self.failed(&record.identity_key, None, &CoreError::from(e)),
        };

        record.external_id = Some(created.external_id.clone());
        record.sync_status = SyncStatus::InSync;
        record.sync_fingerprint = Some(local.fingerprint);
        record.last_synced_at = Some(Utc::now());

        match self.ctx.resource_repository.update(&record).await {
            Ok(()) => ItemOutcome::ok(
                self.kind,
                &record.identity_key,
                Some(&created.external_id),
                SyncAction::Created,
            ),
            Err(e) => {
                log::error!(
                    "{} '{}' created on the panel as '{}' but the local link failed: {e}",
                    self.kind,
                    record.identity_key,
                    created.external_id
                );
                ItemOutcome::failed(
                    self.kind,
                    &record.identity_key,
                    Some(&created.external_id),
                    FailureCategory::LocalWriteFailure,
                    format!(
                        "created on the panel as '{}' but the local link failed: {e}",
                        created.external_id
                    ),
                )
            }
        }
    }

    async fn mark_missing(&self, local: LocalEntry) -> ItemOutcome {
        let mut record = local.record;
        let external_id = record.external_id.clone().unwrap_or_default();
        self.mark_diverged(&mut record).await;
        ItemOutcome::failed(
            self.kind,
            &record.identity_key,
            Some(&external_id),
            FailureCategory::NotFound,
            format!("linked {} '{external_id}' no longer exists on the panel", self.kind),
        )
    }
}
