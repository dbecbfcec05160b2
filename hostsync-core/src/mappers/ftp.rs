use hostsync_panel::{PanelFtpAccount, RemoteResourceData, ResourceKind};

use super::{kind_mismatch, normalize_name, require_non_empty, FieldValue, ResourceMapper};
use crate::error::CoreResult;
use crate::types::{FtpAccountPayload, ResourcePayload};

pub struct FtpAccountMapper;

impl FtpAccountMapper {
    fn payload<'a>(&self, payload: &'a ResourcePayload) -> CoreResult<&'a FtpAccountPayload> {
        match payload {
            ResourcePayload::FtpAccount(f) => Ok(f),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

/// `/public_html/` and `/public_html` are the same directory; `/` stays `/`.
fn canonical_home(dir: &str) -> String {
    let trimmed = dir.trim();
    let stripped = trimmed.trim_end_matches('/');
    if stripped.is_empty() && trimmed.starts_with('/') {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}

impl ResourceMapper for FtpAccountMapper {
    fn kind(&self) -> ResourceKind {
        ResourceKind::FtpAccount
    }

    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String> {
        Ok(normalize_name(&self.payload(payload)?.username))
    }

    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()> {
        let f = self.payload(payload)?;
        require_non_empty(self.kind(), "username", &f.username)?;
        require_non_empty(self.kind(), "home directory", &f.home_dir)
    }

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload> {
        match data {
            RemoteResourceData::FtpAccount(f) => {
                Ok(ResourcePayload::FtpAccount(FtpAccountPayload {
                    username: f.username.clone(),
                    home_dir: f.home_dir.clone(),
                    quota_mb: f.quota_mb,
                }))
            }
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData> {
        let f = self.payload(payload)?;
        Ok(RemoteResourceData::FtpAccount(PanelFtpAccount {
            username: f.username.trim().to_string(),
            home_dir: canonical_home(&f.home_dir),
            quota_mb: f.quota_mb,
        }))
    }

    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>> {
        let f = self.payload(payload)?;
        Ok(vec![
            ("username", Some(f.username.clone())),
            ("homeDir", Some(f.home_dir.clone())),
            ("quotaMb", f.quota_mb.map(|q| q.to_string())),
        ])
    }

    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload> {
        let f = self.payload(payload)?;
        Ok(ResourcePayload::FtpAccount(FtpAccountPayload {
            username: normalize_name(&f.username),
            home_dir: canonical_home(&f.home_dir),
            quota_mb: f.quota_mb,
        }))
    }
}
