//! Pairing of local records with panel resources of one kind

use std::collections::HashMap;

use hostsync_panel::{RemoteResource, ResourceKind};

use crate::error::CoreResult;
use crate::mappers::mapper_for;
use crate::types::{ManagedResource, ResourcePayload, SyncStatus};
use crate::utils::fingerprint::payload_fingerprint;

/// A local record with its current fingerprint.
#[derive(Debug, Clone)]
pub(crate) struct LocalEntry {
    pub record: ManagedResource,
    pub fingerprint: String,
}

impl LocalEntry {
    pub fn new(record: ManagedResource) -> CoreResult<Self> {
        let fingerprint = payload_fingerprint(&record.payload)?;
        Ok(Self {
            record,
            fingerprint,
        })
    }

    pub fn key(&self) -> &str {
        &self.record.identity_key
    }

    pub fn external_id(&self) -> Option<&str> {
        self.record.external_id.as_deref()
    }

    /// Local side edited since the last successful sync.
    pub fn local_changed(&self) -> bool {
        self.record.sync_status == SyncStatus::Diverged
            || self
                .record
                .sync_fingerprint
                .as_deref()
                .is_some_and(|baseline| baseline != self.fingerprint)
    }

    /// Panel side differs from the last successful sync.
    pub fn remote_changed(&self, remote: &RemoteEntry) -> bool {
        self.record.sync_fingerprint.as_deref() != Some(remote.fingerprint.as_str())
    }

    pub fn same_state(&self, remote: &RemoteEntry) -> bool {
        self.fingerprint == remote.fingerprint
    }

    /// Nothing to write: states match and the record already says so.
    pub fn is_settled(&self, remote: &RemoteEntry) -> bool {
        self.record.sync_status == SyncStatus::InSync
            && self.record.sync_fingerprint.as_deref() == Some(remote.fingerprint.as_str())
    }
}

/// A panel resource translated into the local model.
#[derive(Debug, Clone)]
pub(crate) struct RemoteEntry {
    pub external_id: String,
    pub payload: ResourcePayload,
    pub identity_key: String,
    pub fingerprint: String,
}

impl RemoteEntry {
    pub fn new(resource: &RemoteResource) -> CoreResult<Self> {
        let mapper = mapper_for(resource.kind());
        let payload = mapper.from_remote(&resource.data)?;
        let identity_key = mapper.identity_key(&payload)?;
        let fingerprint = payload_fingerprint(&payload)?;
        Ok(Self {
            external_id: resource.external_id.clone(),
            payload,
            identity_key,
            fingerprint,
        })
    }
}

/// Both sides of one kind for one account, loaded before any write.
#[derive(Debug)]
pub(crate) struct Snapshot {
    pub kind: ResourceKind,
    pub locals: Vec<LocalEntry>,
    pub remotes: Vec<RemoteEntry>,
}

impl Snapshot {
    pub fn new(
        kind: ResourceKind,
        records: Vec<ManagedResource>,
        resources: &[RemoteResource],
    ) -> CoreResult<Self> {
        let locals = records
            .into_iter()
            .map(LocalEntry::new)
            .collect::<CoreResult<Vec<_>>>()?;
        let remotes = resources
            .iter()
            .map(RemoteEntry::new)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self {
            kind,
            locals,
            remotes,
        })
    }
}

/// Lookup tables over a [`Snapshot`], by position.
#[derive(Debug, Default)]
pub(crate) struct PairingIndex {
    remote_by_id: HashMap<String, usize>,
    remote_by_key: HashMap<String, Vec<usize>>,
    local_by_id: HashMap<String, usize>,
    unlinked_by_key: HashMap<String, Vec<usize>>,
    linked_by_key: HashMap<String, Vec<usize>>,
}

impl PairingIndex {
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut index = Self::default();

        for (pos, remote) in snapshot.remotes.iter().enumerate() {
            index.remote_by_id.insert(remote.external_id.clone(), pos);
            index
                .remote_by_key
                .entry(remote.identity_key.clone())
                .or_default()
                .push(pos);
        }

        for (pos, local) in snapshot.locals.iter().enumerate() {
            if let Some(external_id) = local.external_id() {
                index.local_by_id.insert(external_id.to_string(), pos);
                index
                    .linked_by_key
                    .entry(local.key().to_string())
                    .or_default()
                    .push(pos);
            } else {
                index
                    .unlinked_by_key
                    .entry(local.key().to_string())
                    .or_default()
                    .push(pos);
            }
        }

        index
    }

    pub fn remote_by_id(&self, external_id: &str) -> Option<usize> {
        self.remote_by_id.get(external_id).copied()
    }

    pub fn local_by_id(&self, external_id: &str) -> Option<usize> {
        self.local_by_id.get(external_id).copied()
    }

    pub fn remotes_with_key(&self, key: &str) -> &[usize] {
        self.remote_by_key.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn unlinked_with_key(&self, key: &str) -> &[usize] {
        self.unlinked_by_key.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn linked_with_key(&self, key: &str) -> &[usize] {
        self.linked_by_key.get(key).map_or(&[], Vec::as_slice)
    }

    /// Remote resources with `key` that no local record is linked to.
    pub fn unclaimed_remotes_with_key(&self, snapshot: &Snapshot, key: &str) -> Vec<usize> {
        self.remotes_with_key(key)
            .iter()
            .copied()
            .filter(|pos| {
                self.local_by_id(&snapshot.remotes[*pos].external_id)
                    .is_none()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{database_record, remote_database};

    #[test]
    fn index_separates_linked_and_unlinked() {
        let snapshot = Snapshot::new(
            ResourceKind::Database,
            vec![
                database_record(1, "shop", Some("ext-1")),
                database_record(2, "blog", None),
                database_record(3, "blog", None),
            ],
            &[remote_database("ext-1", "shop"), remote_database("ext-2", "blog")],
        )
        .unwrap();
        let index = PairingIndex::build(&snapshot);

        assert_eq!(index.local_by_id("ext-1"), Some(0));
        assert_eq!(index.remote_by_id("ext-2"), Some(1));
        assert_eq!(index.unlinked_with_key("blog"), &[1, 2]);
        assert_eq!(index.linked_with_key("shop"), &[0]);
        assert!(index.unclaimed_remotes_with_key(&snapshot, "shop").is_empty());
        assert_eq!(index.unclaimed_remotes_with_key(&snapshot, "blog"), vec![1]);
    }

    #[test]
    fn change_detection_against_baseline() {
        let remote = RemoteEntry::new(&remote_database("ext-1", "shop")).unwrap();

        let mut record = database_record(1, "shop", Some("ext-1"));
        record.sync_fingerprint = Some(remote.fingerprint.clone());
        let settled = LocalEntry::new(record.clone()).unwrap();
        assert!(settled.is_settled(&remote));
        assert!(!settled.local_changed());
        assert!(!settled.remote_changed(&remote));

        record.sync_status = SyncStatus::Diverged;
        assert!(LocalEntry::new(record.clone()).unwrap().local_changed());

        record.sync_status = SyncStatus::InSync;
        record.sync_fingerprint = None;
        let never_synced = LocalEntry::new(record).unwrap();
        assert!(!never_synced.local_changed());
        assert!(never_synced.remote_changed(&remote));
    }
}
