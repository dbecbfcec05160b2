//! Managed resource persistence trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{ManagedResource, NewManagedResource, ResourceKind};

/// Managed resource repository
///
/// Each call is expected to be transactional on its own; reconciliation never
/// needs a transaction spanning several calls.
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// All resources of an account, optionally restricted to one kind
    async fn list_by_account(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
    ) -> CoreResult<Vec<ManagedResource>>;

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ManagedResource>>;

    /// Current holder of a panel id. Checked before a record is linked,
    /// since the pairing snapshot may be stale.
    async fn find_by_external_id(
        &self,
        account_id: i64,
        kind: ResourceKind,
        external_id: &str,
    ) -> CoreResult<Option<ManagedResource>>;

    /// Identity keys are not unique; every match is returned. Creating a
    /// record whose key is already taken logs a warning.
    async fn find_by_identity_key(
        &self,
        account_id: i64,
        kind: ResourceKind,
        identity_key: &str,
    ) -> CoreResult<Vec<ManagedResource>>;

    /// Insert a resource; the store assigns id and timestamps
    async fn create(&self, resource: &NewManagedResource) -> CoreResult<ManagedResource>;

    /// Persist changes to an existing resource
    async fn update(&self, resource: &ManagedResource) -> CoreResult<()>;

    async fn delete(&self, id: i64) -> CoreResult<()>;
}
