//! Error handling and display for the CLI.

use bmx_client::ClientError;
use colored::Colorize;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Not authenticated. No API token was provided.")]
    NotAuthenticated,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Map a 404 from the API to [`CliError::NotFound`].
pub fn not_found(err: ClientError, what: impl FnOnce() -> String) -> anyhow::Error {
    match err {
        ClientError::Api { status: 404, .. } => CliError::NotFound(what()).into(),
        other => other.into(),
    }
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = hint(err) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn hint(err: &anyhow::Error) -> Option<&'static str> {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::NotAuthenticated => {
                Some("Hint: Run `bmx auth login --token <token>` or set BMX_TOKEN.")
            }
            _ => None,
        };
    }

    match err.downcast_ref::<ClientError>()? {
        ClientError::Token(_) | ClientError::Unauthorized => {
            Some("Hint: The API rejected the token. Run `bmx auth login` with a fresh one.")
        }
        ClientError::Api { status: 403, .. } => {
            Some("Hint: You may not have permission for this operation.")
        }
        ClientError::Network(_) => {
            Some("Hint: Check your network connection and API endpoint (--api-url).")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_404() {
        let err = not_found(
            ClientError::Api {
                status: 404,
                body: String::new(),
            },
            || "Keychain '7' not found".to_string(),
        );
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotFound(msg)) if msg == "Keychain '7' not found"
        ));
    }

    #[test]
    fn test_not_found_keeps_other_errors() {
        let err = not_found(ClientError::Unauthorized, || unreachable!());
        assert!(err.downcast_ref::<ClientError>().is_some());
    }

    #[test]
    fn test_hints() {
        assert!(hint(&CliError::NotAuthenticated.into())
            .unwrap()
            .contains("bmx auth login"));
        assert!(hint(&ClientError::Unauthorized.into()).is_some());
        assert!(hint(&CliError::NotFound("x".into()).into()).is_none());
        assert!(hint(&anyhow::anyhow!("other")).is_none());
    }
}
