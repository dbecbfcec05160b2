//! Reconciliation between local records and the hosting panel
//!
//! Every operation loads both sides before writing anything. If either side
//! cannot be read the operation fails closed: nothing is written and the
//! result carries `success = false`. Per-item failures never abort a run.

mod decision;
mod execute;
mod pairing;

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use hostsync_panel::{HostingPanel, RemoteResource, ResourceKind};
use tokio::time::Instant;

pub(crate) use self::decision::Task;
pub(crate) use self::execute::Executor;
pub(crate) use self::pairing::LocalEntry;

use self::decision::{compare, plan_export, plan_import};
use self::pairing::{PairingIndex, Snapshot};
use super::report::SyncReportBuilder;
use super::ServiceContext;
use crate::error::{CoreError, CoreResult};
use crate::types::{HostingAccount, ManagedResource, SyncComparison, SyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Import,
    Export,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::Export => "Export",
        }
    }
}

/// Import, export and compare for hosting accounts.
pub struct ReconciliationService {
    ctx: Arc<ServiceContext>,
}

impl ReconciliationService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Pull every resource kind from the panel into the local store.
    ///
    /// Fails with an error only when the request itself is invalid (unknown
    /// or unlinked account, unregistered server). Panel or store failures come
    /// back as an unsuccessful [`SyncResult`].
    pub async fn import_from_server(&self, account_id: i64) -> CoreResult<SyncResult> {
        self.sync(account_id, None, Direction::Import).await
    }

    /// Import restricted to one resource kind.
    pub async fn import_kind_from_server(
        &self,
        account_id: i64,
        kind: ResourceKind,
    ) -> CoreResult<SyncResult> {
        self.sync(account_id, Some(kind), Direction::Import).await
    }

    /// Push local records to the panel. Never deletes panel resources.
    pub async fn export_to_server(&self, account_id: i64) -> CoreResult<SyncResult> {
        self.sync(account_id, None, Direction::Export).await
    }

    pub async fn export_kind_to_server(
        &self,
        account_id: i64,
        kind: ResourceKind,
    ) -> CoreResult<SyncResult> {
        self.sync(account_id, Some(kind), Direction::Export).await
    }

    /// Read-only diff of both sides. Unlike import and export, a panel that
    /// cannot be read is an error.
    pub async fn compare_with_server(&self, account_id: i64) -> CoreResult<SyncComparison> {
        self.compare(account_id, None).await
    }

    pub async fn compare_kind_with_server(
        &self,
        account_id: i64,
        kind: ResourceKind,
    ) -> CoreResult<SyncComparison> {
        self.compare(account_id, Some(kind)).await
    }

    /// Import every account on a server.
    ///
    /// Accounts run concurrently up to `account_concurrency`. An account that
    /// fails as a whole, including one that is not linked yet, is reported
    /// and the batch continues.
    pub async fn import_all_accounts_from_server(&self, server_id: i64) -> CoreResult<SyncResult> {
        let panel = self.ctx.get_panel(server_id).await?;
        let accounts = self.ctx.account_repository.find_by_server(server_id).await?;
        log::info!(
            "Importing {} account(s) from server {server_id}",
            accounts.len()
        );

        let limit = self.ctx.settings.account_concurrency.max(1);
        let mut results: Vec<(i64, CoreResult<SyncResult>)> = stream::iter(accounts)
            .map(|account| {
                let panel = Arc::clone(&panel);
                async move {
                    let account_id = account.id;
                    (account_id, self.import_account(account, panel).await)
                }
            })
            .buffer_unordered(limit)
            .collect()
            .await;
        results.sort_by_key(|(account_id, _)| *account_id);

        let mut report = SyncReportBuilder::new("Import-all");
        for (account_id, result) in results {
            match result {
                Ok(result) => report.merge_account(account_id, result),
                Err(e) => {
                    log::warn!("Import of hosting account {account_id} failed: {e}");
                    report.account_failure(account_id, &e);
                }
            }
        }

        let result = report.finish();
        log::info!("{}", result.message);
        Ok(result)
    }

    async fn import_account(
        &self,
        account: HostingAccount,
        panel: Arc<dyn HostingPanel>,
    ) -> CoreResult<SyncResult> {
        let _guard = self.ctx.lock_account(account.id).await;
        let external_id = account
            .external_id()
            .ok_or(CoreError::AccountNotLinked(account.id))?
            .to_string();
        self.run(&account, &external_id, panel, None, Direction::Import)
            .await
    }

    async fn sync(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
        direction: Direction,
    ) -> CoreResult<SyncResult> {
        let _guard = self.ctx.lock_account(account_id).await;
        let (account, external_id, panel) = self.ctx.linked_account(account_id).await?;

        log::info!(
            "{} for hosting account {account_id} ('{external_id}'){}",
            direction.label(),
            kind.map(|k| format!(" restricted to {k}")).unwrap_or_default()
        );

        match self.run(&account, &external_id, panel, kind, direction).await {
            Ok(result) => {
                log::info!("{}", result.message);
                Ok(result)
            }
            Err(e) => {
                let label = direction.label();
                if e.is_expected() {
                    log::warn!("{label} aborted for hosting account {account_id}: {e}");
                } else {
                    log::error!("{label} aborted for hosting account {account_id}: {e}");
                }
                Ok(SyncReportBuilder::new(direction.label()).abort(&e))
            }
        }
    }

    /// Errors from here are fail-closed aborts; nothing has been written.
    async fn run(
        &self,
        account: &HostingAccount,
        external_id: &str,
        panel: Arc<dyn HostingPanel>,
        kind: Option<ResourceKind>,
        direction: Direction,
    ) -> CoreResult<SyncResult> {
        let deadline = self
            .ctx
            .settings
            .operation_timeout()
            .map(|timeout| Instant::now() + timeout);
        let snapshots = self
            .load_snapshots(account.id, external_id, panel.as_ref(), kind)
            .await?;

        let mut report = SyncReportBuilder::new(direction.label());
        for snapshot in snapshots {
            let index = PairingIndex::build(&snapshot);
            let plan = match direction {
                Direction::Import => plan_import(&snapshot, &index),
                Direction::Export => plan_export(&snapshot, &index),
            };
            log::debug!(
                "{} {}: {} planned write(s), {} immediate outcome(s)",
                direction.label(),
                snapshot.kind,
                plan.tasks.len(),
                plan.outcomes.len()
            );
            report.extend(plan.outcomes);

            let executor = Executor {
                ctx: &self.ctx,
                panel: Arc::clone(&panel),
                account_id: account.id,
                account: external_id,
                kind: snapshot.kind,
                deadline,
            };
            report.extend(executor.run_all(plan.tasks).await);
        }

        Ok(report.finish())
    }

    async fn compare(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
    ) -> CoreResult<SyncComparison> {
        let _guard = self.ctx.lock_account(account_id).await;
        let (_, external_id, panel) = self.ctx.linked_account(account_id).await?;

        let snapshots = self
            .load_snapshots(account_id, &external_id, panel.as_ref(), kind)
            .await
            .map_err(|e| match e {
                CoreError::Panel(panel_error) => {
                    CoreError::RemoteUnavailable(panel_error.to_string())
                }
                other => other,
            })?;

        let mut comparison = SyncComparison {
            account_id,
            local_only: Vec::new(),
            remote_only: Vec::new(),
            diverged: Vec::new(),
        };
        for snapshot in &snapshots {
            compare(snapshot, &PairingIndex::build(snapshot), &mut comparison)?;
        }
        Ok(comparison)
    }

    /// Both sides of every requested kind, in [`ResourceKind::ALL`] order.
    async fn load_snapshots(
        &self,
        account_id: i64,
        external_id: &str,
        panel: &dyn HostingPanel,
        kind: Option<ResourceKind>,
    ) -> CoreResult<Vec<Snapshot>> {
        let remote = match kind {
            Some(kind) => panel.list_resources(external_id, kind).await?,
            None => panel.list_all_resources(external_id).await?,
        };
        let local = self
            .ctx
            .resource_repository
            .list_by_account(account_id, kind)
            .await?;

        let mut remote_by_kind: HashMap<ResourceKind, Vec<RemoteResource>> = HashMap::new();
        for resource in remote {
            remote_by_kind.entry(resource.kind()).or_default().push(resource);
        }
        let mut local_by_kind: HashMap<ResourceKind, Vec<ManagedResource>> = HashMap::new();
        for record in local {
            local_by_kind.entry(record.kind).or_default().push(record);
        }

        ResourceKind::ALL
            .iter()
            .copied()
            .filter(|k| kind.is_none_or(|only| only == *k))
            .map(|k| {
                Snapshot::new(
                    k,
                    local_by_kind.remove(&k).unwrap_or_default(),
                    &remote_by_kind.remove(&k).unwrap_or_default(),
                )
            })
            .collect()
    }
}
