//! Token storage commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::config::Credentials;
use crate::error::CliError;
use crate::output::{print_info, print_json, print_success, OutputFormat};

use super::CommandContext;

/// Token storage commands.
#[derive(Debug, Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Debug, Subcommand)]
enum AuthSubcommand {
    /// Store an API token for later commands.
    Login,

    /// Remove the stored API token.
    Logout,

    /// Show where the API token comes from.
    Status,
}

impl AuthCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        match self.command {
            AuthSubcommand::Login => login(ctx),
            AuthSubcommand::Logout => logout(),
            AuthSubcommand::Status => status(ctx),
        }
    }
}

/// Store the token given with `--token` or `BMX_TOKEN`.
fn login(ctx: CommandContext) -> Result<()> {
    let token = ctx
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CliError::InvalidArgument("pass the token with --token".to_string()))?;

    Credentials::new(token).save()?;
    print_success(&format!("Token saved to {:?}", Credentials::path()?));
    Ok(())
}

fn logout() -> Result<()> {
    if Credentials::delete()? {
        print_success("Stored token removed.");
    } else {
        print_info("No stored token.");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct AuthStatus<'a> {
    authenticated: bool,
    source: Option<&'static str>,
    api_url: &'a str,
}

fn status(ctx: CommandContext) -> Result<()> {
    let source = if ctx.token.as_deref().is_some_and(|t| !t.is_empty()) {
        Some("flag")
    } else if ctx.token().is_some() {
        Some("credentials")
    } else {
        None
    };

    let status = AuthStatus {
        authenticated: source.is_some(),
        source,
        api_url: ctx.api_url(),
    };

    match ctx.format {
        OutputFormat::Json => print_json(&status),
        OutputFormat::Table => match status.source {
            Some("flag") => print_info(&format!(
                "Using token from --token/BMX_TOKEN against {}",
                status.api_url
            )),
            Some(_) => print_info(&format!(
                "Using stored token against {}",
                status.api_url
            )),
            None => print_info("Not authenticated."),
        },
    }
    Ok(())
}
