use hostsync_panel::{PanelDomain, RemoteResourceData, ResourceKind};

use super::{kind_mismatch, require_non_empty, FieldValue, ResourceMapper};
use crate::error::{CoreError, CoreResult};
use crate::types::{DomainPayload, ResourcePayload};

pub struct DomainMapper;

/// Lower-case, trimmed, without the root dot.
fn canonical_domain(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

impl DomainMapper {
    fn payload<'a>(&self, payload: &'a ResourcePayload) -> CoreResult<&'a DomainPayload> {
        match payload {
            ResourcePayload::Domain(d) => Ok(d),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

impl ResourceMapper for DomainMapper {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Domain
    }

    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String> {
        Ok(canonical_domain(&self.payload(payload)?.name))
    }

    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()> {
        let d = self.payload(payload)?;
        require_non_empty(self.kind(), "name", &d.name)?;

        let name = canonical_domain(&d.name);
        if name.chars().any(char::is_whitespace) || name.split('.').any(str::is_empty) {
            return Err(CoreError::ValidationError(format!(
                "'{}' is not a valid domain name",
                d.name
            )));
        }
        Ok(())
    }

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload> {
        match data {
            RemoteResourceData::Domain(d) => Ok(ResourcePayload::Domain(DomainPayload {
                name: d.domain.clone(),
                document_root: d.document_root.clone(),
                php_version: d.php_version.clone(),
                ssl_enabled: d.ssl_enabled,
            })),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData> {
        let d = self.payload(payload)?;
        Ok(RemoteResourceData::Domain(PanelDomain {
            domain: canonical_domain(&d.name),
            document_root: d.document_root.clone(),
            php_version: d.php_version.clone(),
            ssl_enabled: d.ssl_enabled,
        }))
    }

    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>> {
        let d = self.payload(payload)?;
        Ok(vec![
            ("name", Some(d.name.clone())),
            ("documentRoot", d.document_root.clone()),
            ("phpVersion", d.php_version.clone()),
            ("sslEnabled", Some(d.ssl_enabled.to_string())),
        ])
    }

    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload> {
        let d = self.payload(payload)?;
        Ok(ResourcePayload::Domain(DomainPayload {
            name: canonical_domain(&d.name),
            ..d.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain(name: &str) -> ResourcePayload {
        ResourcePayload::Domain(DomainPayload {
            name: name.to_string(),
            document_root: Some("/public_html".to_string()),
            php_version: None,
            ssl_enabled: true,
        })
    }

    #[test]
    fn identity_key_strips_case_and_root_dot() {
        assert_eq!(
            DomainMapper.identity_key(&domain(" Example.COM. ")).unwrap(),
            "example.com"
        );
    }

    #[test]
    fn validate_rejects_empty_labels() {
        assert!(DomainMapper.validate(&domain("example.com")).is_ok());
        assert!(DomainMapper.validate(&domain("")).is_err());
        assert!(DomainMapper.validate(&domain("a..com")).is_err());
        assert!(DomainMapper.validate(&domain("my site.com")).is_err());
    }

    #[test]
    fn remote_round_trip_keeps_attributes() {
        let remote = DomainMapper.to_remote(&domain("Shop.Example.com")).unwrap();
        let RemoteResourceData::Domain(ref d) = remote else {
            panic!("expected domain, got {remote:?}");
        };
        assert_eq!(d.domain, "shop.example.com");
        assert_eq!(d.document_root.as_deref(), Some("/public_html"));

        let back = DomainMapper.from_remote(&remote).unwrap();
        assert!(DomainMapper
            .same_state(&back, &domain("shop.example.com."))
            .unwrap());
    }
}
