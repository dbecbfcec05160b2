//! Subcommand handlers. Every handler prints its result as pretty JSON.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use hostsync_app::AppState;
use hostsync_core::types::{NewHostingAccount, SyncResult};

use crate::cli::{AccountCommand, Command, ResourceCommand, SyncArgs};
use crate::config::Config;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerSummary {
    id: i64,
    name: String,
    base_url: String,
    registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials_valid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run(command: Command, state: &AppState, config: &Config) -> Result<ExitCode> {
    match command {
        Command::Account(cmd) => account(cmd, state).await,
        Command::Resource(ResourceCommand::List { account, kind }) => {
            let resources = state.resource_service.list_resources(account, kind).await?;
            print_json(&resources)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Import(SyncArgs { account, kind }) => {
            let service = &state.reconciliation_service;
            let result = match kind {
                Some(kind) => service.import_kind_from_server(account, kind).await?,
                None => service.import_from_server(account).await?,
            };
            report(&result)
        }
        Command::Export(SyncArgs { account, kind }) => {
            let service = &state.reconciliation_service;
            let result = match kind {
                Some(kind) => service.export_kind_to_server(account, kind).await?,
                None => service.export_to_server(account).await?,
            };
            report(&result)
        }
        Command::Compare(SyncArgs { account, kind }) => {
            let service = &state.reconciliation_service;
            let comparison = match kind {
                Some(kind) => service.compare_kind_with_server(account, kind).await?,
                None => service.compare_with_server(account).await?,
            };
            print_json(&comparison)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::ImportAll { server } => {
            let result = state
                .reconciliation_service
                .import_all_accounts_from_server(server)
                .await?;
            report(&result)
        }
        Command::Servers { check } => servers(state, config, check).await,
    }
}

async fn account(cmd: AccountCommand, state: &AppState) -> Result<ExitCode> {
    match cmd {
        AccountCommand::Add {
            server,
            customer,
            external_id,
        } => {
            let created = state
                .account_service
                .create_account(NewHostingAccount {
                    server_id: server,
                    customer_id: customer,
                    external_id,
                })
                .await?;
            print_json(&created)?;
        }
        AccountCommand::List { server } => {
            let accounts = state.account_service.list_accounts(server).await?;
            print_json(&accounts)?;
        }
        AccountCommand::Link {
            account,
            external_id,
        } => {
            let linked = state
                .account_service
                .link_external_id(account, &external_id)
                .await?;
            print_json(&linked)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn servers(state: &AppState, config: &Config, check: bool) -> Result<ExitCode> {
    let mut summaries = Vec::with_capacity(config.servers.len());
    for server in &config.servers {
        let panel = state.ctx.panel_registry.get(server.id).await;
        let mut summary = ServerSummary {
            id: server.id,
            name: server.display_name(),
            base_url: server.credentials.base_url().to_string(),
            registered: panel.is_some(),
            credentials_valid: None,
            error: None,
        };
        if let (true, Some(panel)) = (check, panel) {
            match panel.validate_credentials().await {
                Ok(valid) => summary.credentials_valid = Some(valid),
                Err(e) => {
                    tracing::warn!("Credential check failed for server {}: {e}", server.id);
                    summary.error = Some(e.to_string());
                }
            }
        }
        summaries.push(summary);
    }
    print_json(&summaries)?;
    Ok(ExitCode::SUCCESS)
}

/// Print a sync result; an unsuccessful run exits non-zero.
fn report(result: &SyncResult) -> Result<ExitCode> {
    print_json(result)?;
    if result.success {
        tracing::info!("{}", result.message);
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("{}", result.message);
        Ok(ExitCode::FAILURE)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
