//! Hosting account service

use std::sync::Arc;

use chrono::Utc;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{HostingAccount, NewHostingAccount};

/// Hosting account management
pub struct HostingAccountService {
    ctx: Arc<ServiceContext>,
}

fn clean_external_id(external_id: &str) -> CoreResult<String> {
    let trimmed = external_id.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(
            "external account id must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl HostingAccountService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn create_account(
        &self,
        mut account: NewHostingAccount,
    ) -> CoreResult<HostingAccount> {
        if let Some(external_id) = account.external_id.as_deref() {
            account.external_id = Some(clean_external_id(external_id)?);
        }
        let created = self.ctx.account_repository.create(&account).await?;
        log::info!(
            "Created hosting account {} on server {}",
            created.id,
            created.server_id
        );
        Ok(created)
    }

    pub async fn get_account(&self, account_id: i64) -> CoreResult<HostingAccount> {
        self.ctx.get_account(account_id).await
    }

    /// All accounts, or only those on one server
    pub async fn list_accounts(&self, server_id: Option<i64>) -> CoreResult<Vec<HostingAccount>> {
        match server_id {
            Some(server_id) => self.ctx.account_repository.find_by_server(server_id).await,
            None => self.ctx.account_repository.find_all().await,
        }
    }

    /// Attach the panel account name. Once set it never changes; linking the
    /// same name again is a no-op.
    pub async fn link_external_id(
        &self,
        account_id: i64,
        external_id: &str,
    ) -> CoreResult<HostingAccount> {
        let requested = clean_external_id(external_id)?;
        let _guard = self.ctx.lock_account(account_id).await;
        let mut account = self.ctx.get_account(account_id).await?;

        match account.external_id.as_deref() {
            Some(current) if current == requested => Ok(account),
            Some(current) => Err(CoreError::ExternalIdImmutable {
                account_id,
                current: current.to_string(),
                requested,
            }),
            None => {
                account.external_id = Some(requested);
                account.updated_at = Utc::now();
                self.ctx.account_repository.update(&account).await?;
                log::info!(
                    "Linked hosting account {account_id} to '{}'",
                    account.external_id().unwrap_or_default()
                );
                Ok(account)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestHarness, TEST_SERVER};

    #[tokio::test]
    async fn create_and_list_by_server() {
        let h = TestHarness::new().await;
        let service = h.account_service();

        let created = service
            .create_account(NewHostingAccount {
                server_id: TEST_SERVER,
                customer_id: 3,
                external_id: Some("  alice ".to_string()),
            })
            .await
            .unwrap();
        service
            .create_account(NewHostingAccount {
                server_id: 9,
                customer_id: 3,
                external_id: None,
            })
            .await
            .unwrap();

        assert_eq!(created.external_id(), Some("alice"));
        assert_eq!(service.list_accounts(Some(TEST_SERVER)).await.unwrap().len(), 1);
        assert_eq!(service.list_accounts(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn blank_external_id_is_rejected() {
        let h = TestHarness::new().await;
        let err = h
            .account_service()
            .create_account(NewHostingAccount {
                server_id: TEST_SERVER,
                customer_id: 3,
                external_id: Some("   ".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn link_is_set_once() {
        let h = TestHarness::new().await;
        h.add_account(42, None).await;
        let service = h.account_service();

        let linked = service.link_external_id(42, "acct42").await.unwrap();
        assert_eq!(linked.external_id(), Some("acct42"));

        // Same value again is fine
        service.link_external_id(42, "acct42").await.unwrap();

        let err = service.link_external_id(42, "other").await.unwrap_err();
        assert!(
            matches!(
                err,
                CoreError::ExternalIdImmutable { ref current, .. } if current == "acct42"
            ),
            "{err:?}"
        );
        assert_eq!(
            service.get_account(42).await.unwrap().external_id(),
            Some("acct42")
        );
    }

    #[tokio::test]
    async fn link_unknown_account() {
        let h = TestHarness::new().await;
        let err = h
            .account_service()
            .link_external_id(77, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound(77)));
    }
}
