//! `HostingPanel` implementation for the REST panel

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;

use crate::error::{PanelError, Result};
use crate::panels::common::join_url;
use crate::traits::{ErrorContext, HostingPanel, PanelErrorMapper};
use crate::types::{RemoteResource, RemoteResourceData, ResourceKind};

use super::{PANEL_NAME, RestPanelClient, WhoAmI, collection};

/// One resource as the panel returns it: an `id` plus kind-specific attributes.
#[derive(Debug, Deserialize)]
struct WireItem {
    id: serde_json::Value,
    #[serde(flatten)]
    attrs: serde_json::Value,
}

impl RestPanelClient {
    fn resource_url(&self, account: &str, kind: ResourceKind, external_id: Option<&str>) -> String {
        match external_id {
            Some(id) => join_url(&self.base_url, &["accounts", account, collection(kind), id]),
            None => join_url(&self.base_url, &["accounts", account, collection(kind)]),
        }
    }

    fn decode_item(&self, kind: ResourceKind, item: WireItem) -> Result<RemoteResource> {
        // Some panels hand out numeric ids
        let external_id = match item.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => return Err(self.parse_error(format!("Unsupported id value: {other}"))),
        };

        let attrs = item.attrs;
        let data = match kind {
            ResourceKind::Domain => serde_json::from_value(attrs).map(RemoteResourceData::Domain),
            ResourceKind::Database => {
                serde_json::from_value(attrs).map(RemoteResourceData::Database)
            }
            ResourceKind::DatabaseUser => {
                serde_json::from_value(attrs).map(RemoteResourceData::DatabaseUser)
            }
            ResourceKind::Mailbox => serde_json::from_value(attrs).map(RemoteResourceData::Mailbox),
            ResourceKind::FtpAccount => {
                serde_json::from_value(attrs).map(RemoteResourceData::FtpAccount)
            }
        }
        .map_err(|e| self.parse_error(format!("{kind} '{external_id}': {e}")))?;

        Ok(RemoteResource { external_id, data })
    }

    fn encode_attrs(&self, data: &RemoteResourceData) -> Result<serde_json::Value> {
        match data {
            RemoteResourceData::Domain(d) => serde_json::to_value(d),
            RemoteResourceData::Database(d) => serde_json::to_value(d),
            RemoteResourceData::DatabaseUser(d) => serde_json::to_value(d),
            RemoteResourceData::Mailbox(d) => serde_json::to_value(d),
            RemoteResourceData::FtpAccount(d) => serde_json::to_value(d),
        }
        .map_err(|e| self.serialization_error(e))
    }
}

#[async_trait]
impl HostingPanel for RestPanelClient {
    fn id(&self) -> &'static str {
        PANEL_NAME
    }

    async fn validate_credentials(&self) -> Result<bool> {
        let url = join_url(&self.base_url, &["whoami"]);
        match self
            .send_for_data::<WhoAmI>(Method::GET, &url, None, ErrorContext::default())
            .await
        {
            Ok(who) => {
                log::info!(
                    "[{PANEL_NAME}] Credentials accepted for reseller {}",
                    who.reseller.as_deref().unwrap_or("<unnamed>")
                );
                Ok(true)
            }
            Err(PanelError::InvalidCredentials { .. } | PanelError::PermissionDenied { .. }) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_resources(
        &self,
        account: &str,
        kind: ResourceKind,
    ) -> Result<Vec<RemoteResource>> {
        let url = self.resource_url(account, kind, None);
        let ctx = ErrorContext {
            account: Some(account.to_string()),
            kind: Some(kind),
            ..Default::default()
        };

        let items: Vec<WireItem> = self
            .send(Method::GET, &url, None, ctx)
            .await?
            .unwrap_or_default();

        let resources = items
            .into_iter()
            .map(|item| self.decode_item(kind, item))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "[{PANEL_NAME}] Listed {} {kind} resource(s) for account {account}",
            resources.len()
        );
        Ok(resources)
    }

    async fn get_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> Result<RemoteResource> {
        let url = self.resource_url(account, kind, Some(external_id));
        let ctx = ErrorContext {
            account: Some(account.to_string()),
            kind: Some(kind),
            external_id: Some(external_id.to_string()),
            name: None,
        };

        let item: WireItem = self.send_for_data(Method::GET, &url, None, ctx).await?;
        self.decode_item(kind, item)
    }

    async fn create_resource(
        &self,
        account: &str,
        data: &RemoteResourceData,
    ) -> Result<RemoteResource> {
        let kind = data.kind();
        let url = self.resource_url(account, kind, None);
        let body = self.encode_attrs(data)?;
        let ctx = ErrorContext {
            account: Some(account.to_string()),
            kind: Some(kind),
            external_id: None,
            name: Some(data.display_name().to_string()),
        };

        let item: WireItem = self
            .send_for_data(Method::POST, &url, Some(&body), ctx)
            .await?;
        let created = self.decode_item(kind, item)?;
        log::info!(
            "[{PANEL_NAME}] Created {kind} '{}' as {} for account {account}",
            data.display_name(),
            created.external_id
        );
        Ok(created)
    }

    async fn update_resource(
        &self,
        account: &str,
        external_id: &str,
        data: &RemoteResourceData,
    ) -> Result<RemoteResource> {
        let kind = data.kind();
        let url = self.resource_url(account, kind, Some(external_id));
        let body = self.encode_attrs(data)?;
        let ctx = ErrorContext {
            account: Some(account.to_string()),
            kind: Some(kind),
            external_id: Some(external_id.to_string()),
            name: Some(data.display_name().to_string()),
        };

        let item: WireItem = self
            .send_for_data(Method::PUT, &url, Some(&body), ctx)
            .await?;
        self.decode_item(kind, item)
    }

    async fn delete_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> Result<()> {
        let url = self.resource_url(account, kind, Some(external_id));
        let ctx = ErrorContext {
            account: Some(account.to_string()),
            kind: Some(kind),
            external_id: Some(external_id.to_string()),
            name: None,
        };

        self.send::<serde_json::Value>(Method::DELETE, &url, None, ctx)
            .await?;
        log::info!("[{PANEL_NAME}] Deleted {kind} {external_id} for account {account}");
        Ok(())
    }
}
