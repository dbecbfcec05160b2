//! Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hostsync_core::types::ResourceKind;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconcile hosting accounts with their control panel",
    long_about = None
)]
pub struct Cli {
    /// Path to hostsync.toml
    #[arg(
        short,
        long,
        global = true,
        env = "HOSTSYNC_CONFIG",
        default_value = "hostsync.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage hosting accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Inspect managed resources
    #[command(subcommand)]
    Resource(ResourceCommand),
    /// Pull panel state into the local store
    Import(SyncArgs),
    /// Push local records to the panel
    Export(SyncArgs),
    /// Show how local records differ from the panel without writing
    Compare(SyncArgs),
    /// Import every account on one server
    ImportAll {
        #[arg(long)]
        server: i64,
    },
    /// List configured panel servers
    Servers {
        /// Also check each server's credentials against the panel
        #[arg(long)]
        check: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Register a hosting account
    Add {
        #[arg(long)]
        server: i64,
        #[arg(long)]
        customer: i64,
        /// Panel-side account name
        #[arg(long)]
        external_id: Option<String>,
    },
    List {
        #[arg(long)]
        server: Option<i64>,
    },
    /// Attach the panel-side account name; it cannot be changed afterwards
    Link {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        external_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ResourceCommand {
    List {
        #[arg(long)]
        account: i64,
        #[arg(long, value_parser = parse_kind)]
        kind: Option<ResourceKind>,
    },
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[arg(long)]
    pub account: i64,
    /// Restrict to one resource kind
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ResourceKind>,
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse(s).ok_or_else(|| {
        let valid: Vec<&str> = ResourceKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown resource kind '{s}', expected one of: {}", valid.join(", "))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_with_kind() {
        let cli = Cli::try_parse_from([
            "hostsync", "import", "--account", "42", "--kind", "mailbox",
        ])
        .unwrap();
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.account, 42);
                assert_eq!(args.kind, Some(ResourceKind::Mailbox));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Cli::try_parse_from(["hostsync", "compare", "--account", "1", "--kind", "dns"])
            .unwrap_err();
        assert!(err.to_string().contains("unknown resource kind 'dns'"));
    }

    #[test]
    fn account_link_and_global_config() {
        let cli = Cli::try_parse_from([
            "hostsync",
            "account",
            "link",
            "--account",
            "7",
            "--external-id",
            "alice",
            "--config",
            "/etc/hostsync.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/hostsync.toml"));
        assert!(matches!(
            cli.command,
            Command::Account(AccountCommand::Link { account: 7, ref external_id })
                if external_id == "alice"
        ));
    }

    #[test]
    fn import_all_requires_server() {
        assert!(Cli::try_parse_from(["hostsync", "import-all"]).is_err());
        let cli = Cli::try_parse_from(["hostsync", "import-all", "--server", "3"]).unwrap();
        assert!(matches!(cli.command, Command::ImportAll { server: 3 }));
    }
}
