//! `HostingAccountRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use hostsync_core::error::{CoreError, CoreResult};
use hostsync_core::traits::HostingAccountRepository;
use hostsync_core::types::{HostingAccount, NewHostingAccount};

use super::entity::hosting_account;
use super::{parse_timestamp, storage_error, SqliteStore};

impl hosting_account::Model {
    fn into_account(self) -> CoreResult<HostingAccount> {
        Ok(HostingAccount {
            id: self.id,
            server_id: self.server_id,
            external_id: self.external_id,
            customer_id: self.customer_id,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

#[async_trait]
impl HostingAccountRepository for SqliteStore {
    async fn find_all(&self) -> CoreResult<Vec<HostingAccount>> {
        let rows = hosting_account::Entity::find()
            .order_by_asc(hosting_account::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query hosting accounts", &e))?;

        rows.into_iter()
            .map(hosting_account::Model::into_account)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<HostingAccount>> {
        let row = hosting_account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| storage_error("query hosting account", &e))?;

        row.map(hosting_account::Model::into_account).transpose()
    }

    async fn find_by_server(&self, server_id: i64) -> CoreResult<Vec<HostingAccount>> {
        let rows = hosting_account::Entity::find()
            .filter(hosting_account::Column::ServerId.eq(server_id))
            .order_by_asc(hosting_account::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error("query hosting accounts", &e))?;

        rows.into_iter()
            .map(hosting_account::Model::into_account)
            .collect()
    }

    async fn create(&self, account: &NewHostingAccount) -> CoreResult<HostingAccount> {
        let now = Utc::now().to_rfc3339();
        let active = hosting_account::ActiveModel {
            id: NotSet,
            server_id: Set(account.server_id),
            external_id: Set(account.external_id.clone()),
            customer_id: Set(account.customer_id),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        active
            .insert(&self.db)
            .await
            .map_err(|e| storage_error("insert hosting account", &e))?
            .into_account()
    }

    async fn update(&self, account: &HostingAccount) -> CoreResult<()> {
        let active = hosting_account::ActiveModel {
            id: Set(account.id),
            server_id: Set(account.server_id),
            external_id: Set(account.external_id.clone()),
            customer_id: Set(account.customer_id),
            created_at: Set(account.created_at.to_rfc3339()),
            updated_at: Set(account.updated_at.to_rfc3339()),
        };

        match active.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(CoreError::AccountNotFound(account.id)),
            Err(e) => Err(storage_error("update hosting account", &e)),
        }
    }
}
