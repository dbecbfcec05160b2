//! Storage and panel registry abstractions

mod account_repository;
mod panel_registry;
mod resource_repository;

pub use account_repository::HostingAccountRepository;
pub use panel_registry::{InMemoryPanelRegistry, PanelRegistry};
pub use resource_repository::ResourceRepository;
