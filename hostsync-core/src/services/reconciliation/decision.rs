//! Decision tables for import, export and compare
//!
//! Planning is pure: it reads a [`Snapshot`] and produces immediate outcomes
//! (unchanged, skipped, conflicts) plus the write tasks the executor runs.

use std::collections::HashSet;

use hostsync_panel::ResourceKind;

use super::pairing::{LocalEntry, PairingIndex, RemoteEntry, Snapshot};
use crate::error::CoreResult;
use crate::mappers::mapper_for;
use crate::services::report::ItemOutcome;
use crate::types::{
    DivergedResource, FailureCategory, FieldDelta, ResourceRef, SyncAction, SyncComparison,
    SyncStatus,
};

/// A write the executor performs for one item.
#[derive(Debug, Clone)]
pub(crate) enum Task {
    /// States already match; record the baseline
    MarkInSync {
        local: LocalEntry,
        remote: RemoteEntry,
    },
    /// Overwrite (and link, if unlinked) the local record from the panel
    Pull {
        local: LocalEntry,
        remote: RemoteEntry,
    },
    CreateLocal {
        remote: RemoteEntry,
    },
    /// Send the local payload to the linked panel resource
    PushUpdate {
        local: LocalEntry,
        external_id: String,
    },
    /// Attach an unlinked record to a panel resource, pushing local state if it differs
    LinkRemote {
        local: LocalEntry,
        remote: RemoteEntry,
        push: bool,
    },
    CreateRemote {
        local: LocalEntry,
    },
    /// Linked resource vanished from the panel
    MarkMissing {
        local: LocalEntry,
    },
}

impl Task {
    pub fn identity(&self) -> (&str, Option<&str>) {
        match self {
            Self::MarkInSync { remote, .. }
            | Self::Pull { remote, .. }
            | Self::CreateLocal { remote }
            | Self::LinkRemote { remote, .. } => {
                (&remote.identity_key, Some(&remote.external_id))
            }
            Self::PushUpdate { local, external_id } => (local.key(), Some(external_id)),
            Self::CreateRemote { local } | Self::MarkMissing { local } => {
                (local.key(), local.external_id())
            }
        }
    }

    pub fn cancelled(&self, kind: ResourceKind) -> ItemOutcome {
        let (key, external_id) = self.identity();
        ItemOutcome::cancelled(kind, key, external_id)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Plan {
    pub outcomes: Vec<ItemOutcome>,
    pub tasks: Vec<Task>,
}

impl Plan {
    fn unchanged(&mut self, kind: ResourceKind, key: &str, external_id: &str) {
        self.outcomes.push(ItemOutcome::ok(
            kind,
            key,
            Some(external_id),
            SyncAction::Unchanged,
        ));
    }

    fn skipped(&mut self, kind: ResourceKind, key: &str, external_id: Option<&str>) {
        self.outcomes
            .push(ItemOutcome::ok(kind, key, external_id, SyncAction::Skipped));
    }

    fn conflict(
        &mut self,
        kind: ResourceKind,
        key: &str,
        external_id: Option<&str>,
        message: String,
    ) {
        log::warn!("{kind} '{key}': {message}");
        self.outcomes.push(ItemOutcome::failed(
            kind,
            key,
            external_id,
            FailureCategory::Conflict,
            message,
        ));
    }
}

/// External id of a linked record that already holds `key`. An identity key
/// is paired at most once; further records with it are never linked.
fn linked_owner<'a>(snapshot: &'a Snapshot, index: &PairingIndex, key: &str) -> Option<&'a str> {
    index
        .linked_with_key(key)
        .first()
        .and_then(|pos| snapshot.locals[*pos].external_id())
}

/// Panel to local. Never deletes local records.
pub(crate) fn plan_import(snapshot: &Snapshot, index: &PairingIndex) -> Plan {
    let kind = snapshot.kind;
    let mut plan = Plan::default();

    for remote in &snapshot.remotes {
        let key = remote.identity_key.as_str();

        if let Some(pos) = index.local_by_id(&remote.external_id) {
            let local = &snapshot.locals[pos];
            if local.same_state(remote) {
                if local.is_settled(remote) {
                    plan.unchanged(kind, key, &remote.external_id);
                } else {
                    plan.tasks.push(Task::MarkInSync {
                        local: local.clone(),
                        remote: remote.clone(),
                    });
                }
            } else if !local.local_changed() {
                plan.tasks.push(Task::Pull {
                    local: local.clone(),
                    remote: remote.clone(),
                });
            } else if !local.remote_changed(remote) {
                // Pending local edit, left for export
                plan.skipped(kind, key, Some(&remote.external_id));
            } else {
                plan.conflict(
                    kind,
                    key,
                    Some(&remote.external_id),
                    "changed locally and on the panel since the last sync".to_string(),
                );
            }
            continue;
        }

        if let Some(owner) = linked_owner(snapshot, index, key) {
            plan.conflict(
                kind,
                key,
                Some(&remote.external_id),
                format!("identity key already linked to panel resource '{owner}'"),
            );
            continue;
        }

        let candidates = index.unlinked_with_key(key);
        let sharing = index.unclaimed_remotes_with_key(snapshot, key).len();
        match candidates {
            [] => plan.tasks.push(Task::CreateLocal {
                remote: remote.clone(),
            }),
            [pos] if sharing == 1 => plan.tasks.push(Task::Pull {
                local: snapshot.locals[*pos].clone(),
                remote: remote.clone(),
            }),
            _ => plan.conflict(
                kind,
                key,
                Some(&remote.external_id),
                format!(
                    "ambiguous identity key: {} local record(s) and {sharing} panel resource(s)",
                    candidates.len()
                ),
            ),
        }
    }

    plan
}

/// Local to panel. Never deletes panel resources.
pub(crate) fn plan_export(snapshot: &Snapshot, index: &PairingIndex) -> Plan {
    let kind = snapshot.kind;
    let mut plan = Plan::default();

    for local in &snapshot.locals {
        let key = local.key();

        if let Some(external_id) = local.external_id() {
            let Some(rpos) = index.remote_by_id(external_id) else {
                plan.tasks.push(Task::MarkMissing {
                    local: local.clone(),
                });
                continue;
            };
            let remote = &snapshot.remotes[rpos];

            if local.same_state(remote) {
                if local.is_settled(remote) {
                    plan.unchanged(kind, key, external_id);
                } else {
                    plan.tasks.push(Task::MarkInSync {
                        local: local.clone(),
                        remote: remote.clone(),
                    });
                }
            } else {
                match (local.local_changed(), local.remote_changed(remote)) {
                    (true, false) => plan.tasks.push(Task::PushUpdate {
                        local: local.clone(),
                        external_id: external_id.to_string(),
                    }),
                    (true, true) => plan.conflict(
                        kind,
                        key,
                        Some(external_id),
                        "changed locally and on the panel since the last sync".to_string(),
                    ),
                    // Panel edit, left for import
                    (false, _) => plan.skipped(kind, key, Some(external_id)),
                }
            }
            continue;
        }

        if let Some(owner) = linked_owner(snapshot, index, key) {
            plan.conflict(
                kind,
                key,
                None,
                format!("identity key already linked to panel resource '{owner}'"),
            );
            continue;
        }

        let unclaimed = index.unclaimed_remotes_with_key(snapshot, key);
        let unlinked = index.unlinked_with_key(key).len();
        match unclaimed.as_slice() {
            [rpos] if unlinked == 1 => {
                let remote = &snapshot.remotes[*rpos];
                plan.tasks.push(Task::LinkRemote {
                    local: local.clone(),
                    remote: remote.clone(),
                    push: !local.same_state(remote),
                });
            }
            [] if index.remotes_with_key(key).is_empty() => {
                plan.tasks.push(Task::CreateRemote {
                    local: local.clone(),
                });
            }
            [] => plan.conflict(
                kind,
                key,
                None,
                "panel resource with this identity key is linked to another record".to_string(),
            ),
            _ => plan.conflict(
                kind,
                key,
                None,
                format!(
                    "ambiguous identity key: {unlinked} local record(s) and {} panel resource(s)",
                    unclaimed.len()
                ),
            ),
        }
    }

    plan
}

fn local_ref(local: &LocalEntry, kind: ResourceKind) -> ResourceRef {
    ResourceRef {
        kind,
        identity_key: local.key().to_string(),
        display_name: local.record.payload.display_name().to_string(),
        local_id: Some(local.record.id),
        external_id: local.record.external_id.clone(),
        sync_status: local.record.sync_status,
    }
}

fn remote_ref(remote: &RemoteEntry, kind: ResourceKind) -> ResourceRef {
    ResourceRef {
        kind,
        identity_key: remote.identity_key.clone(),
        display_name: remote.payload.display_name().to_string(),
        local_id: None,
        external_id: Some(remote.external_id.clone()),
        sync_status: SyncStatus::RemoteOnly,
    }
}

/// Read-only three-way diff of one kind into `comparison`.
pub(crate) fn compare(
    snapshot: &Snapshot,
    index: &PairingIndex,
    comparison: &mut SyncComparison,
) -> CoreResult<()> {
    let kind = snapshot.kind;
    let mapper = mapper_for(kind);
    let mut matched: HashSet<usize> = HashSet::new();

    for local in &snapshot.locals {
        if let Some(external_id) = local.external_id() {
            match index.remote_by_id(external_id) {
                Some(rpos) => {
                    matched.insert(rpos);
                    let remote = &snapshot.remotes[rpos];
                    if !local.same_state(remote) {
                        comparison.diverged.push(DivergedResource {
                            kind,
                            identity_key: local.key().to_string(),
                            local_id: local.record.id,
                            external_id: external_id.to_string(),
                            deltas: mapper.diff(&local.record.payload, &remote.payload)?,
                        });
                    }
                }
                None => comparison.local_only.push(local_ref(local, kind)),
            }
            continue;
        }

        let unclaimed = index.unclaimed_remotes_with_key(snapshot, local.key());
        let pairable = index.unlinked_with_key(local.key()).len() == 1
            && linked_owner(snapshot, index, local.key()).is_none();
        match unclaimed.as_slice() {
            [rpos] if pairable => {
                matched.insert(*rpos);
                let remote = &snapshot.remotes[*rpos];
                let mut deltas = vec![FieldDelta {
                    field: "externalId".to_string(),
                    local: None,
                    remote: Some(remote.external_id.clone()),
                }];
                deltas.extend(mapper.diff(&local.record.payload, &remote.payload)?);
                comparison.diverged.push(DivergedResource {
                    kind,
                    identity_key: local.key().to_string(),
                    local_id: local.record.id,
                    external_id: remote.external_id.clone(),
                    deltas,
                });
            }
            _ => comparison.local_only.push(local_ref(local, kind)),
        }
    }

    comparison.remote_only.extend(
        snapshot
            .remotes
            .iter()
            .enumerate()
            .filter(|(pos, _)| !matched.contains(pos))
            .map(|(_, remote)| remote_ref(remote, kind)),
    );

    Ok(())
}
