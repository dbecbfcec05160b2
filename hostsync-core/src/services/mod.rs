//! Business logic service layer

mod hosting_account_service;
mod reconciliation;
mod report;
mod resource_service;

pub use hosting_account_service::HostingAccountService;
pub use reconciliation::ReconciliationService;
pub use report::SyncReportBuilder;
pub use resource_service::ResourceService;

use std::sync::Arc;

use hostsync_panel::HostingPanel;

use crate::error::{CoreError, CoreResult};
use crate::traits::{HostingAccountRepository, PanelRegistry, ResourceRepository};
use crate::types::{HostingAccount, ReconcileSettings};
use crate::utils::account_lock::{AccountGuard, AccountLocks};

/// Service context - holds every dependency.
///
/// The platform layer builds it and injects its storage implementations.
pub struct ServiceContext {
    /// Hosting account repository
    pub account_repository: Arc<dyn HostingAccountRepository>,
    /// Managed resource repository
    pub resource_repository: Arc<dyn ResourceRepository>,
    /// Panel clients by server id
    pub panel_registry: Arc<dyn PanelRegistry>,
    /// Per-account operation locks
    pub account_locks: AccountLocks,
    pub settings: ReconcileSettings,
}

impl ServiceContext {
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn HostingAccountRepository>,
        resource_repository: Arc<dyn ResourceRepository>,
        panel_registry: Arc<dyn PanelRegistry>,
        settings: ReconcileSettings,
    ) -> Self {
        Self {
            account_repository,
            resource_repository,
            panel_registry,
            account_locks: AccountLocks::new(),
            settings,
        }
    }

    /// Load an account or fail with `AccountNotFound`.
    pub async fn get_account(&self, account_id: i64) -> CoreResult<HostingAccount> {
        self.account_repository
            .find_by_id(account_id)
            .await?
            .ok_or(CoreError::AccountNotFound(account_id))
    }

    /// Panel client for a server or `ServerNotFound`.
    pub async fn get_panel(&self, server_id: i64) -> CoreResult<Arc<dyn HostingPanel>> {
        self.panel_registry
            .get(server_id)
            .await
            .ok_or(CoreError::ServerNotFound(server_id))
    }

    /// Account, its panel account name and its panel client.
    ///
    /// Fails before any I/O against the panel when the account is unknown,
    /// unlinked, or on an unregistered server.
    pub async fn linked_account(
        &self,
        account_id: i64,
    ) -> CoreResult<(HostingAccount, String, Arc<dyn HostingPanel>)> {
        let account = self.get_account(account_id).await?;
        let external_id = account
            .external_id()
            .ok_or(CoreError::AccountNotLinked(account_id))?
            .to_string();
        let panel = self.get_panel(account.server_id).await?;
        Ok((account, external_id, panel))
    }

    /// Serialize operations on one account.
    pub async fn lock_account(&self, account_id: i64) -> AccountGuard {
        self.account_locks.acquire(account_id).await
    }
}
