//! `SeaORM` entity for the `managed_resources` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "managed_resources")]
/// Database row model for a managed resource.
///
/// `payload` holds the JSON of the kind-tagged payload; timestamps are RFC 3339.
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    pub kind: String,
    pub external_id: Option<String>,
    pub identity_key: String,
    pub payload: String,
    pub sync_status: String,
    pub sync_fingerprint: Option<String>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
