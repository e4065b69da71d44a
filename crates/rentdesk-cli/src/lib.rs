pub mod cli;
pub mod commands;
pub mod input;

use anyhow::Context;
use rentdesk_core::constants::ALLOWED_ROLES;
use rentdesk_core::{ApiError, ApiErrorKind, AuthCredentials, ErrorMetadata, LogLevel};

pub use cli::Cli;
pub use commands::{execute, Outcome};

/// Shown for server-side failures (status 500).
pub const GENERIC_ERROR: &str = "There was an error while processing the request";
/// Shown when the server gave no usable message.
pub const FALLBACK_ERROR: &str = "Unable to complete the request";

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Entity commands need a session holding one of the admin roles.
pub fn require_admin(credentials: &AuthCredentials) -> anyhow::Result<()> {
    if !credentials.is_authenticated() {
        anyhow::bail!("Not logged in. Run `rentdesk otp <email>` then `rentdesk login <email> <code>`");
    }
    if !credentials.has_access(ALLOWED_ROLES) {
        anyhow::bail!(
            "{} is not allowed to manage listings (requires one of: {})",
            credentials.display_name(),
            ALLOWED_ROLES.join(", ")
        );
    }
    Ok(())
}

/// One-line message for a failed command.
pub fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => match api.kind {
            ApiErrorKind::Unauthorized => {
                "Session expired, please log in again".to_string()
            }
            ApiErrorKind::Validation | ApiErrorKind::Config => api.message.clone(),
            ApiErrorKind::Network | ApiErrorKind::Timeout => api.to_string(),
            _ => api.notification_message(GENERIC_ERROR, FALLBACK_ERROR),
        },
        None => format!("{:#}", err),
    }
}

/// Log a failed command at the level its error asks for.
pub fn log_error(err: &anyhow::Error) {
    let Some(api) = err.downcast_ref::<ApiError>() else {
        tracing::error!(error = ?err, "Command failed");
        return;
    };
    match api.log_level() {
        LogLevel::Debug => {
            tracing::debug!(code = api.error_code(), status = ?api.status, error = %api, "Command failed")
        }
        LogLevel::Warn => {
            tracing::warn!(code = api.error_code(), status = ?api.status, error = %api, "Command failed")
        }
        LogLevel::Error => {
            tracing::error!(
                code = api.error_code(),
                status = ?api.status,
                recoverable = api.is_recoverable(),
                error = %api,
                "Command failed"
            )
        }
    }
}

pub fn print_outcome(outcome: &Outcome) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(&outcome.body).context("Serialize response")?;
    println!("{}", out);
    if let Some(message) = &outcome.message {
        eprintln!("{}", message);
    }
    Ok(())
}
