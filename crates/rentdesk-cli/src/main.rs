//! rentdesk CLI: admin client for the rentdesk listings API.
//!
//! Set RENTDESK_API_URL (or API_BASE_URL). Credentials from `rentdesk login`
//! are kept in RENTDESK_CREDENTIALS_PATH and sent as a bearer token.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use rentdesk_api_client::ApiClient;
use rentdesk_cli::{error_message, execute, init_tracing, log_error, print_outcome, Cli};

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = ApiClient::from_env()
        .context("Failed to create API client. Set RENTDESK_API_URL (or API_BASE_URL)")?;
    let outcome = execute(&client, cli.command).await?;
    print_outcome(&outcome)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_error(&err);
            eprintln!("error: {}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}
