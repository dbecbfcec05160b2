use hostsync_panel::{PanelDatabase, PanelDatabaseUser, RemoteResourceData, ResourceKind};

use super::{kind_mismatch, normalize_name, require_non_empty, FieldValue, ResourceMapper};
use crate::error::CoreResult;
use crate::types::{DatabasePayload, DatabaseUserPayload, ResourcePayload};

// ===== Database =====

pub struct DatabaseMapper;

impl DatabaseMapper {
    fn payload<'a>(&self, payload: &'a ResourcePayload) -> CoreResult<&'a DatabasePayload> {
        match payload {
            ResourcePayload::Database(d) => Ok(d),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

impl ResourceMapper for DatabaseMapper {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Database
    }

    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String> {
        Ok(normalize_name(&self.payload(payload)?.name))
    }

    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()> {
        require_non_empty(self.kind(), "name", &self.payload(payload)?.name)
    }

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload> {
        match data {
            RemoteResourceData::Database(d) => Ok(ResourcePayload::Database(DatabasePayload {
                name: d.name.clone(),
                charset: d.charset.clone(),
            })),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData> {
        let d = self.payload(payload)?;
        Ok(RemoteResourceData::Database(PanelDatabase {
            name: d.name.trim().to_string(),
            charset: d.charset.clone(),
        }))
    }

    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>> {
        let d = self.payload(payload)?;
        Ok(vec![("name", Some(d.name.clone())), ("charset", d.charset.clone())])
    }

    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload> {
        let d = self.payload(payload)?;
        Ok(ResourcePayload::Database(DatabasePayload {
            name: normalize_name(&d.name),
            charset: d.charset.as_deref().map(normalize_name),
        }))
    }
}

// ===== Database user =====

pub struct DatabaseUserMapper;

impl DatabaseUserMapper {
    fn payload<'a>(&self, payload: &'a ResourcePayload) -> CoreResult<&'a DatabaseUserPayload> {
        match payload {
            ResourcePayload::DatabaseUser(u) => Ok(u),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

impl ResourceMapper for DatabaseUserMapper {
    fn kind(&self) -> ResourceKind {
        ResourceKind::DatabaseUser
    }

    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String> {
        Ok(normalize_name(&self.payload(payload)?.username))
    }

    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()> {
        let u = self.payload(payload)?;
        require_non_empty(self.kind(), "username", &u.username)?;
        require_non_empty(self.kind(), "host", &u.host)
    }

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload> {
        match data {
            RemoteResourceData::DatabaseUser(u) => {
                Ok(ResourcePayload::DatabaseUser(DatabaseUserPayload {
                    username: u.username.clone(),
                    host: u.host.clone(),
                    databases: u.databases.clone(),
                }))
            }
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData> {
        let u = self.payload(payload)?;
        Ok(RemoteResourceData::DatabaseUser(PanelDatabaseUser {
            username: u.username.trim().to_string(),
            host: u.host.trim().to_string(),
            databases: u.databases.clone(),
        }))
    }

    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>> {
        let u = self.payload(payload)?;
        Ok(vec![
            ("username", Some(u.username.clone())),
            ("host", Some(u.host.clone())),
            ("databases", Some(u.databases.join(","))),
        ])
    }

    /// Grants compare as a set.
    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload> {
        let u = self.payload(payload)?;
        let mut databases: Vec<String> = u.databases.iter().map(|d| normalize_name(d)).collect();
        databases.sort_unstable();
        databases.dedup();

        Ok(ResourcePayload::DatabaseUser(DatabaseUserPayload {
            username: normalize_name(&u.username),
            host: normalize_name(&u.host),
            databases,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, databases: &[&str]) -> ResourcePayload {
        ResourcePayload::DatabaseUser(DatabaseUserPayload {
            username: username.to_string(),
            host: "localhost".to_string(),
            databases: databases.iter().map(ToString::to_string).collect(),
        })
    }

    #[test]
    fn database_identity_is_lowercase_name() {
        let payload = ResourcePayload::Database(DatabasePayload {
            name: " Shop_DB ".to_string(),
            charset: Some("UTF8MB4".to_string()),
        });
        assert_eq!(DatabaseMapper.identity_key(&payload).unwrap(), "shop_db");
    }

    #[test]
    fn database_validate_rejects_blank_name() {
        let payload = ResourcePayload::Database(DatabasePayload {
            name: "  ".to_string(),
            charset: None,
        });
        assert!(DatabaseMapper.validate(&payload).is_err());
    }

    #[test]
    fn grant_order_does_not_matter() {
        assert!(DatabaseUserMapper
            .same_state(&user("wp", &["b", "a"]), &user("WP", &["a", "b", "a"]))
            .unwrap());
        assert!(!DatabaseUserMapper
            .same_state(&user("wp", &["a"]), &user("wp", &["a", "c"]))
            .unwrap());
    }

    #[test]
    fn user_from_remote_keeps_host() {
        let payload = DatabaseUserMapper
            .from_remote(&RemoteResourceData::DatabaseUser(PanelDatabaseUser {
                username: "wp".to_string(),
                host: "%".to_string(),
                databases: vec!["shop".to_string()],
            }))
            .unwrap();
        let ResourcePayload::DatabaseUser(u) = payload else {
            panic!("expected database user");
        };
        assert_eq!(u.host, "%");
    }
}
