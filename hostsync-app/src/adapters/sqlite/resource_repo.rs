//! `ResourceRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use hostsync_core::error::{CoreError, CoreResult};
use hostsync_core::traits::ResourceRepository;
use hostsync_core::types::{
    ManagedResource, NewManagedResource, ResourceKind, ResourcePayload, SyncStatus,
};

use super::entity::managed_resource;
use super::{parse_timestamp, storage_error, SqliteStore};

impl managed_resource::Model {
    /// Convert a row into a `ManagedResource`; the payload must match the stored kind.
    fn into_resource(self) -> CoreResult<ManagedResource> {
        let kind = ResourceKind::parse(&self.kind).ok_or_else(|| {
            CoreError::SerializationError(format!("Invalid kind: {}", self.kind))
        })?;
        let payload: ResourcePayload = serde_json::from_str(&self.payload)
            .map_err(|e| CoreError::SerializationError(format!("Invalid payload: {e}")))?;
        if payload.kind() != kind {
            return Err(CoreError::SerializationError(format!(
                "Resource {} is stored as {kind} but holds a {} payload",
                self.id,
                payload.kind()
            )));
        }
        let sync_status = SyncStatus::parse(&self.sync_status).ok_or_else(|| {
            CoreError::SerializationError(format!("Invalid sync_status: {}", self.sync_status))
        })?;

        Ok(ManagedResource {
            id: self.id,
            account_id: self.account_id,
            kind,
            external_id: self.external_id,
            identity_key: self.identity_key,
            payload,
            sync_status,
            sync_fingerprint: self.sync_fingerprint,
            last_synced_at: self
                .last_synced_at
                .as_deref()
                .map(|t| parse_timestamp("last_synced_at", t))
                .transpose()?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

fn payload_json(payload: &ResourcePayload) -> CoreResult<String> {
    serde_json::to_string(payload).map_err(|e| CoreError::SerializationError(e.to_string()))
}

#[async_trait]
impl ResourceRepository for SqliteStore {
    async fn list_by_account(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
    ) -> CoreResult<Vec<ManagedResource>> {
        let mut query = managed_resource::Entity::find()
            .filter(managed_resource::Column::AccountId.eq(account_id));
        if let Some(kind) = kind {
            query = query.filter(managed_resource::Column::Kind.eq(kind.as_str()));
        }

        let rows = query
            .order_by_asc(managed_resource::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query resources", &e))?;

        rows.into_iter()
            .map(managed_resource::Model::into_resource)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ManagedResource>> {
        let row = managed_resource::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| storage_error("query resource", &e))?;

        row.map(managed_resource::Model::into_resource).transpose()
    }

    async fn find_by_external_id(
        &self,
        account_id: i64,
        kind: ResourceKind,
        external_id: &str,
    ) -> CoreResult<Option<ManagedResource>> {
        let row = managed_resource::Entity::find()
            .filter(managed_resource::Column::AccountId.eq(account_id))
            .filter(managed_resource::Column::Kind.eq(kind.as_str()))
            .filter(managed_resource::Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await
            .map_err(|e| storage_error("query resource", &e))?;

        row.map(managed_resource::Model::into_resource).transpose()
    }

    async fn find_by_identity_key(
        &self,
        account_id: i64,
        kind: ResourceKind,
        identity_key: &str,
    ) -> CoreResult<Vec<ManagedResource>> {
        let rows = managed_resource::Entity::find()
            .filter(managed_resource::Column::AccountId.eq(account_id))
            .filter(managed_resource::Column::Kind.eq(kind.as_str()))
            .filter(managed_resource::Column::IdentityKey.eq(identity_key))
            .order_by_asc(managed_resource::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query resources", &e))?;

        rows.into_iter()
            .map(managed_resource::Model::into_resource)
            .collect()
    }

    async fn create(&self, resource: &NewManagedResource) -> CoreResult<ManagedResource> {
        let now = Utc::now().to_rfc3339();
        let active = managed_resource::ActiveModel {
            id: NotSet,
            account_id: Set(resource.account_id),
            kind: Set(resource.kind().as_str().to_string()),
            external_id: Set(resource.external_id.clone()),
            identity_key: Set(resource.identity_key.clone()),
            payload: Set(payload_json(&resource.payload)?),
            sync_status: Set(resource.sync_status.as_str().to_string()),
            sync_fingerprint: Set(resource.sync_fingerprint.clone()),
            last_synced_at: Set(resource.last_synced_at.map(|t| t.to_rfc3339())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        active
            .insert(&self.db)
            .await
            .map_err(|e| storage_error("insert resource", &e))?
            .into_resource()
    }

    async fn update(&self, resource: &ManagedResource) -> CoreResult<()> {
        let active = managed_resource::ActiveModel {
            id: Set(resource.id),
            account_id: Set(resource.account_id),
            kind: Set(resource.kind.as_str().to_string()),
            external_id: Set(resource.external_id.clone()),
            identity_key: Set(resource.identity_key.clone()),
            payload: Set(payload_json(&resource.payload)?),
            sync_status: Set(resource.sync_status.as_str().to_string()),
            sync_fingerprint: Set(resource.sync_fingerprint.clone()),
            last_synced_at: Set(resource.last_synced_at.map(|t| t.to_rfc3339())),
            created_at: Set(resource.created_at.to_rfc3339()),
            updated_at: Set(Utc::now().to_rfc3339()),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(CoreError::ResourceNotFound(resource.id)),
            Err(e) => Err(storage_error("update resource", &e)),
        }
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        let result = managed_resource::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| storage_error("delete resource", &e))?;

        if result.rows_affected == 0 {
            return Err(CoreError::ResourceNotFound(id));
        }
        Ok(())
    }
}
