use hostsync_panel::{PanelMailbox, RemoteResourceData, ResourceKind};

use super::{kind_mismatch, normalize_name, FieldValue, ResourceMapper};
use crate::error::{CoreError, CoreResult};
use crate::types::{MailboxPayload, ResourcePayload};

pub struct MailboxMapper;

impl MailboxMapper {
    fn payload<'a>(&self, payload: &'a ResourcePayload) -> CoreResult<&'a MailboxPayload> {
        match payload {
            ResourcePayload::Mailbox(m) => Ok(m),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

/// `local@domain.tld`, one `@`, dotted domain, no whitespace.
fn is_valid_address(address: &str) -> bool {
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !address.chars().any(char::is_whitespace)
}

impl ResourceMapper for MailboxMapper {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Mailbox
    }

    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String> {
        Ok(normalize_name(&self.payload(payload)?.address))
    }

    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()> {
        let m = self.payload(payload)?;
        if !is_valid_address(m.address.trim()) {
            return Err(CoreError::ValidationError(format!(
                "'{}' is not a valid mailbox address",
                m.address
            )));
        }
        Ok(())
    }

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload> {
        match data {
            RemoteResourceData::Mailbox(m) => Ok(ResourcePayload::Mailbox(MailboxPayload {
                address: m.email.clone(),
                quota_mb: m.quota_mb,
                suspended: m.suspended,
            })),
            other => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData> {
        let m = self.payload(payload)?;
        Ok(RemoteResourceData::Mailbox(PanelMailbox {
            email: normalize_name(&m.address),
            quota_mb: m.quota_mb,
            suspended: m.suspended,
        }))
    }

    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>> {
        let m = self.payload(payload)?;
        Ok(vec![
            ("address", Some(m.address.clone())),
            ("quotaMb", m.quota_mb.map(|q| q.to_string())),
            ("suspended", Some(m.suspended.to_string())),
        ])
    }

    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload> {
        let m = self.payload(payload)?;
        Ok(ResourcePayload::Mailbox(MailboxPayload {
            address: normalize_name(&m.address),
            ..m.clone()
        }))
    }
}
