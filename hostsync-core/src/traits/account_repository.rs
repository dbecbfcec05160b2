//! Hosting account persistence trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{HostingAccount, NewHostingAccount};

/// Hosting account repository
///
/// Platform implementation:
/// - `hostsync-app`: `SqliteStore` (`SeaORM`)
#[async_trait]
pub trait HostingAccountRepository: Send + Sync {
    /// Get all accounts
    async fn find_all(&self) -> CoreResult<Vec<HostingAccount>>;

    /// Get an account by local id
    async fn find_by_id(&self, id: i64) -> CoreResult<Option<HostingAccount>>;

    /// Get every account hosted on a panel server
    async fn find_by_server(&self, server_id: i64) -> CoreResult<Vec<HostingAccount>>;

    /// Insert an account; the store assigns the id
    async fn create(&self, account: &NewHostingAccount) -> CoreResult<HostingAccount>;

    /// Persist changes to an existing account
    async fn update(&self, account: &HostingAccount) -> CoreResult<()>;
}
