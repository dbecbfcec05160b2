//! Hosting account reconciliation core
//!
//! Keeps a local record of the resources (domains, databases, database users,
//! mailboxes, FTP accounts) that hosting accounts own on a control panel, and
//! reconciles it with the panel:
//! - Import: panel to local, never deletes local records
//! - Export: local to panel, never deletes panel resources
//! - Compare: read-only three-way diff
//!
//! Storage and the panel registry are traits; `hostsync-app` provides the
//! `SQLite` implementation and `hostsync-panel` the panel clients.

pub mod error;
pub mod mappers;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult};
pub use services::{
    HostingAccountService, ReconciliationService, ResourceService, ServiceContext,
    SyncReportBuilder,
};
pub use traits::{
    HostingAccountRepository, InMemoryPanelRegistry, PanelRegistry, ResourceRepository,
};
