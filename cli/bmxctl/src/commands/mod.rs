//! CLI commands.

mod auth;
mod keychains;
mod tenants;

use std::sync::Arc;

use anyhow::Result;
use bmx_auth::StaticToken;
use bmx_client::{ApiClient, ClientConfig};
use clap::{Parser, Subcommand};

use crate::config::{Config, Credentials};
use crate::error::CliError;
use crate::output::OutputFormat;

/// bmx - Manage ButterflyMX keychains and virtual keys.
#[derive(Debug, Parser)]
#[command(name = "bmx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    /// API base URL. Overrides the config file.
    #[arg(long, global = true, env = "BMX_API_URL")]
    api_url: Option<String>,

    /// API token. Overrides stored credentials.
    #[arg(long, global = true, env = "BMX_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store or remove the API token.
    Auth(auth::AuthCommand),

    /// Manage keychains and their virtual keys.
    Keychains(keychains::KeychainsCommand),

    /// List tenants and their doors, or open a door.
    Tenants(tenants::TenantsCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let credentials = Credentials::load()?;

        let ctx = CommandContext {
            config,
            credentials,
            format: self.format,
            api_url: self.api_url,
            token: self.token,
        };

        match self.command {
            Commands::Auth(cmd) => cmd.run(ctx).await,
            Commands::Keychains(cmd) => cmd.run(ctx).await,
            Commands::Tenants(cmd) => cmd.run(ctx).await,
            Commands::Version => {
                println!("bmx {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub credentials: Option<Credentials>,
    pub format: OutputFormat,
    pub api_url: Option<String>,
    pub token: Option<String>,
}

impl CommandContext {
    /// Resolve the API URL, preferring flag over config.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(self.config.api_url())
    }

    /// Resolve the API token, preferring flag over stored credentials.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .or_else(|| self.credentials.as_ref().map(|c| c.token.as_str()))
            .filter(|t| !t.is_empty())
    }

    /// Get an authenticated API client.
    pub fn client(&self) -> Result<ApiClient> {
        let token = self.token().ok_or(CliError::NotAuthenticated)?;
        let config = ClientConfig::default().with_base_url(self.api_url());
        Ok(ApiClient::new(Arc::new(StaticToken::new(token)), config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(token: Option<&str>, stored: Option<&str>) -> CommandContext {
        CommandContext {
            config: Config::default(),
            credentials: stored.map(|t| Credentials::new(t.to_string())),
            format: OutputFormat::Table,
            api_url: None,
            token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_flag_token_wins_over_stored() {
        assert_eq!(ctx(Some("flag"), Some("stored")).token(), Some("flag"));
        assert_eq!(ctx(None, Some("stored")).token(), Some("stored"));
        assert_eq!(ctx(None, None).token(), None);
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert_eq!(ctx(Some(""), None).token(), None);
        assert!(ctx(None, None).client().is_err());
    }

    #[test]
    fn test_api_url_flag_wins_over_config() {
        let mut ctx = ctx(None, None);
        assert_eq!(ctx.api_url(), bmx_client::DEFAULT_API_URL);
        ctx.api_url = Some("http://localhost:3000".to_string());
        assert_eq!(ctx.api_url(), "http://localhost:3000");
    }

    #[test]
    fn test_cli_parses_keychains_list() {
        let cli = Cli::try_parse_from([
            "bmx", "--format", "json", "keychains", "list", "--tenant", "42",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Keychains(_)));
    }

    #[test]
    fn test_cli_parses_tenants_unlock() {
        let cli = Cli::try_parse_from([
            "bmx",
            "tenants",
            "unlock",
            "prod-tenant-7",
            "--access-point",
            "53449",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Tenants(_)));

        assert!(Cli::try_parse_from(["bmx", "tenants", "unlock", "prod-unit-7", "--access-point", "1"])
            .is_err());
    }

    #[test]
    fn test_keychain_create_needs_doors() {
        let base = [
            "bmx",
            "keychains",
            "create",
            "--tenant",
            "42",
            "--name",
            "Plumber",
            "--starts-at",
            "2025-12-09T16:58:00-08:00",
            "--ends-at",
            "2025-12-10T16:58:00-08:00",
        ];
        assert!(Cli::try_parse_from(base).is_err());

        let all_doors = base.iter().copied().chain(["--all-doors"]);
        assert!(Cli::try_parse_from(all_doors).is_ok());

        let both = base
            .iter()
            .copied()
            .chain(["--all-doors", "--access-point", "1"]);
        assert!(Cli::try_parse_from(both).is_err());
    }
}
