//! Type definitions

mod account;
mod resource;
mod sync;

pub use account::{HostingAccount, NewHostingAccount};
pub use resource::{
    DatabasePayload, DatabaseUserPayload, DomainPayload, FtpAccountPayload, MailboxPayload,
    ManagedResource, NewManagedResource, ResourcePayload, SyncStatus,
};
pub use sync::{
    DivergedResource, FailureCategory, FieldDelta, ReconcileSettings, ResourceChange,
    ResourceRef, SyncAction, SyncComparison, SyncFailure, SyncItem, SyncResult,
};

// Re-export panel-side types
pub use hostsync_panel::{
    PanelDatabase, PanelDatabaseUser, PanelDomain, PanelFtpAccount, PanelMailbox,
    RemoteResource, RemoteResourceData, ResourceKind,
};
