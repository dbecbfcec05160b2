use async_trait::async_trait;

use crate::error::{PanelError, Result};
use crate::types::{RemoteResource, RemoteResourceData, ResourceKind};

/// Raw API error (internal use)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code as reported by the panel
    pub code: Option<String>,
    /// Original error message
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Extra information used while mapping a raw error (internal use)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// External account identifier (for `AccountNotFound`)
    pub account: Option<String>,
    /// Resource kind of the request, if any
    pub kind: Option<ResourceKind>,
    /// External resource id (for `ResourceNotFound`)
    pub external_id: Option<String>,
    /// Natural name of the resource (for `ResourceExists`)
    pub name: Option<String>,
}

/// Maps raw panel API errors to [`PanelError`] (internal use)
pub(crate) trait PanelErrorMapper {
    /// Panel identifier used in every error
    fn panel_name(&self) -> &'static str;

    /// Map a raw API error to the unified error type
    fn map_error(&self, raw: RawApiError, context: ErrorContext) -> PanelError;

    fn parse_error(&self, detail: impl ToString) -> PanelError {
        PanelError::ParseError {
            panel: self.panel_name().to_string(),
            detail: detail.to_string(),
        }
    }

    fn serialization_error(&self, detail: impl ToString) -> PanelError {
        PanelError::SerializationError {
            panel: self.panel_name().to_string(),
            detail: detail.to_string(),
        }
    }

    /// Fallback for codes the mapper does not recognize
    fn unknown_error(&self, raw: RawApiError) -> PanelError {
        PanelError::Unknown {
            panel: self.panel_name().to_string(),
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// A hosting control panel reachable through a reseller login.
///
/// Every operation is scoped to one hosting account on the panel, addressed by
/// the account's external identifier. Resources are addressed by their
/// panel-assigned `external_id`.
#[async_trait]
pub trait HostingPanel: Send + Sync {
    /// Panel client identifier
    fn id(&self) -> &'static str;

    /// Check that the reseller credentials are accepted
    async fn validate_credentials(&self) -> Result<bool>;

    /// List every resource of `kind` under the account
    async fn list_resources(
        &self,
        account: &str,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteResource>>;

    /// Fetch one resource by its external id
    async fn get_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> Result<RemoteResource>;

    /// Create a resource; the panel assigns the external id
    async fn create_resource(
        &self,
        account: &str,
        data: &RemoteResourceData,
    ) -> Result<RemoteResource>;

    /// Replace the attributes of an existing resource
    async fn update_resource(
        &self,
        account: &str,
        external_id: &str,
        data: &RemoteResourceData,
    ) -> Result<RemoteResource>;

    /// Delete a resource
    async fn delete_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> Result<()>;

    /// List resources of every kind under the account.
    ///
    /// The default implementation issues one `list_resources()` per kind
    /// concurrently and fails on the first error. Panels with a combined
    /// listing endpoint may override it.
    async fn list_all_resources(&self, account: &str) -> Result<Vec<RemoteResource>> {
        let futures: Vec<_> = ResourceKind::ALL
            .iter()
            .map(|kind| self.list_resources(account, *kind))
            .collect();
        let results = futures::future::join_all(futures).await;

        let mut resources = Vec::new();
        for result in results {
            resources.extend(result?);
        }
        Ok(resources)
    }
}
