//! `SeaORM` entities for `SqliteStore`.

pub mod hosting_account;
pub mod managed_resource;
