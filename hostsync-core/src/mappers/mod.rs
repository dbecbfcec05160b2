//! Resource mappers
//!
//! One mapper per resource kind. A mapper translates between the local
//! [`ResourcePayload`] and the panel's [`RemoteResourceData`], derives the
//! identity key used to pair unlinked records, and normalizes payloads so that
//! comparisons ignore natural-key case.

mod database;
mod domain;
mod ftp;
mod mailbox;

pub use database::{DatabaseMapper, DatabaseUserMapper};
pub use domain::DomainMapper;
pub use ftp::FtpAccountMapper;
pub use mailbox::MailboxMapper;

use hostsync_panel::{RemoteResourceData, ResourceKind};

use crate::error::{CoreError, CoreResult};
use crate::types::{FieldDelta, ResourcePayload};

/// Field name and rendered value, used for field-by-field deltas.
pub type FieldValue = (&'static str, Option<String>);

/// Translation and identity rules for one resource kind.
pub trait ResourceMapper: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Normalized natural key.
    fn identity_key(&self, payload: &ResourcePayload) -> CoreResult<String>;

    /// Reject payloads that can never be created on a panel.
    fn validate(&self, payload: &ResourcePayload) -> CoreResult<()>;

    fn from_remote(&self, data: &RemoteResourceData) -> CoreResult<ResourcePayload>;

    fn to_remote(&self, payload: &ResourcePayload) -> CoreResult<RemoteResourceData>;

    /// Comparable fields in a fixed order.
    fn fields(&self, payload: &ResourcePayload) -> CoreResult<Vec<FieldValue>>;

    /// Canonical form for comparison and fingerprinting.
    fn normalize(&self, payload: &ResourcePayload) -> CoreResult<ResourcePayload>;

    /// Whether two payloads describe the same state.
    fn same_state(&self, a: &ResourcePayload, b: &ResourcePayload) -> CoreResult<bool> {
        Ok(self.normalize(a)? == self.normalize(b)?)
    }

    /// Fields whose normalized values differ between `local` and `remote`.
    fn diff(
        &self,
        local: &ResourcePayload,
        remote: &ResourcePayload,
    ) -> CoreResult<Vec<FieldDelta>> {
        let local_fields = self.fields(&self.normalize(local)?)?;
        let remote_fields = self.fields(&self.normalize(remote)?)?;

        Ok(local_fields
            .into_iter()
            .zip(remote_fields)
            .filter(|((_, l), (_, r))| l != r)
            .map(|((field, l), (_, r))| FieldDelta {
                field: field.to_string(),
                local: l,
                remote: r,
            })
            .collect())
    }
}

/// The mapper for `kind`.
pub fn mapper_for(kind: ResourceKind) -> &'static dyn ResourceMapper {
    match kind {
        ResourceKind::Domain => &DomainMapper,
        ResourceKind::Database => &DatabaseMapper,
        ResourceKind::DatabaseUser => &DatabaseUserMapper,
        ResourceKind::Mailbox => &MailboxMapper,
        ResourceKind::FtpAccount => &FtpAccountMapper,
    }
}

pub(crate) fn kind_mismatch(expected: ResourceKind, actual: ResourceKind) -> CoreError {
    CoreError::ValidationError(format!(
        "{expected} mapper cannot handle a {actual} payload"
    ))
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub(crate) fn require_non_empty(kind: ResourceKind, field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::ValidationError(format!(
            "{kind} {field} must not be empty"
        )));
    }
    Ok(())
}
