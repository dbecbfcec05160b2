//! Platform-agnostic application bootstrap for `HostSync`.
//!
//! Provides `AppState` (service container), `AppStateBuilder` (adapter
//! injection) and `ServerConfig` (one panel server entry from configuration).

pub mod adapters;

use std::sync::Arc;

use serde::Deserialize;

use hostsync_core::error::{CoreError, CoreResult};
use hostsync_core::services::{
    HostingAccountService, ReconciliationService, ResourceService, ServiceContext,
};
use hostsync_core::traits::{
    HostingAccountRepository, InMemoryPanelRegistry, PanelRegistry, ResourceRepository,
};
use hostsync_core::types::ReconcileSettings;
use hostsync_panel::{create_panel_client, PanelCredentials, PanelOptions};

/// A control panel server the reseller manages accounts on.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server id that `HostingAccount::server_id` refers to
    pub id: i64,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    pub credentials: PanelCredentials,
    #[serde(default)]
    pub options: PanelOptions,
}

impl ServerConfig {
    /// Name for logs and listings, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("server-{}", self.id))
    }
}

/// Platform-agnostic application state.
///
/// Holds all services and the `ServiceContext`. Every frontend constructs this
/// once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all storage adapters)
    pub ctx: Arc<ServiceContext>,
    /// Hosting account service
    pub account_service: HostingAccountService,
    /// Single-resource service
    pub resource_service: ResourceService,
    /// Import / export / compare
    pub reconciliation_service: ReconciliationService,
}

impl AppState {
    /// Create a panel client for every configured server and register it.
    ///
    /// Returns the number of registered servers. Nothing is sent to the
    /// panels here; credentials are only checked for shape.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` on a duplicate server id and
    /// `CoreError::Panel` when a client cannot be built. Servers before the
    /// failing entry stay registered.
    pub async fn register_panels(&self, servers: &[ServerConfig]) -> CoreResult<usize> {
        let mut seen = Vec::with_capacity(servers.len());
        for server in servers {
            if seen.contains(&server.id) {
                return Err(CoreError::ValidationError(format!(
                    "Duplicate server id {}",
                    server.id
                )));
            }
            seen.push(server.id);

            let panel = create_panel_client(server.credentials.clone(), &server.options)?;
            self.ctx.panel_registry.register(server.id, panel).await;
            log::info!(
                "Registered panel for {} (id {})",
                server.display_name(),
                server.id
            );
        }
        Ok(seen.len())
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `account_repository`: how hosting accounts are stored
/// - `resource_repository`: how managed resources are stored
///
/// # Optional
/// - `panel_registry`: defaults to `InMemoryPanelRegistry`
/// - `settings`: defaults to `ReconcileSettings::default()`
pub struct AppStateBuilder {
    account_repository: Option<Arc<dyn HostingAccountRepository>>,
    resource_repository: Option<Arc<dyn ResourceRepository>>,
    panel_registry: Option<Arc<dyn PanelRegistry>>,
    settings: ReconcileSettings,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_repository: None,
            resource_repository: None,
            panel_registry: None,
            settings: ReconcileSettings::default(),
        }
    }

    #[must_use]
    pub fn account_repository(mut self, repo: Arc<dyn HostingAccountRepository>) -> Self {
        self.account_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn resource_repository(mut self, repo: Arc<dyn ResourceRepository>) -> Self {
        self.resource_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn panel_registry(mut self, registry: Arc<dyn PanelRegistry>) -> Self {
        self.panel_registry = Some(registry);
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: ReconcileSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing.
    pub fn build(self) -> CoreResult<AppState> {
        let account_repository = self.account_repository.ok_or_else(|| {
            CoreError::ValidationError("account_repository is required".to_string())
        })?;
        let resource_repository = self.resource_repository.ok_or_else(|| {
            CoreError::ValidationError("resource_repository is required".to_string())
        })?;
        let panel_registry = self
            .panel_registry
            .unwrap_or_else(|| Arc::new(InMemoryPanelRegistry::new()));

        let ctx = Arc::new(ServiceContext::new(
            account_repository,
            resource_repository,
            panel_registry,
            self.settings,
        ));

        Ok(AppState {
            account_service: HostingAccountService::new(Arc::clone(&ctx)),
            resource_service: ResourceService::new(Arc::clone(&ctx)),
            reconciliation_service: ReconciliationService::new(Arc::clone(&ctx)),
            ctx,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
