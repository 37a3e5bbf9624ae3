//! `bazaar` -- command-line client for the Bazaar marketplace backend.
//!
//! Keeps the login session in a JSON file so successive invocations stay
//! signed in, and refreshes the access token transparently when it expires.
//!
//! # Environment variables
//!
//! | Variable                      | Required | Default                        | Description                          |
//! |-------------------------------|----------|--------------------------------|--------------------------------------|
//! | `BAZAAR_API_URL`              | no       | `http://localhost:5000/api/v1` | Backend base URL with API prefix     |
//! | `BAZAAR_REQUEST_TIMEOUT_SECS` | no       | `30`                           | Transport timeout per request        |
//! | `BAZAAR_REFRESH_PATH`         | no       | `/auth/refresh`                | Refresh exchange path                |
//! | `BAZAAR_LOGIN_PATH`           | no       | `/auth`                        | Login entry point after session loss |
//! | `BAZAAR_ROTATE_REFRESH_TOKEN` | no       | `false`                        | Store rotated refresh tokens         |
//! | `BAZAAR_SESSION_FILE`         | no       | `.bazaar-session.json`         | Where the session is persisted       |

use std::process::ExitCode;
use std::sync::Arc;

use bazaar_cli::command::{Cli, Command};
use bazaar_client::{ApiClient, ClientConfig, FileTokenStore, LogNavigator};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SESSION_FILE: &str = ".bazaar-session.json";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_cli=info,bazaar_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let command = match Cli::try_parse() {
        Ok(cli) => cli.command,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match execute(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn execute(command: Command) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    let session_file = std::env::var("BAZAAR_SESSION_FILE")
        .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
    let store = Arc::new(FileTokenStore::open(&session_file));

    tracing::debug!(api_url = %config.api_url, session_file = %session_file, "Starting bazaar");

    let client = ApiClient::new(&config, store, Arc::new(LogNavigator))?;
    let output = bazaar_cli::run::run(&client, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
