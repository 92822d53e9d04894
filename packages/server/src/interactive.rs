//! Interactive mode for the server.
//!
//! Prompts for the data files, bind address and port before starting the
//! server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};
use hdb_map_dataset::{DataPaths, LoadOptions};

use crate::{ServerConfig, ServerError};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults come from the default data paths and the `BIND_ADDR` and
/// `PORT` environment variables.
///
/// # Errors
///
/// Returns [`ServerError`] if the data fails to load or the server fails
/// to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("HDB Block Map Server");
    println!();

    let defaults = ServerConfig::from_env(DataPaths::default(), LoadOptions::default(), None);

    let paths = DataPaths {
        aggregate: prompt_path("Aggregate CSV", &defaults.paths.aggregate),
        transactions: prompt_path("Transaction CSV", &defaults.paths.transactions),
        token: prompt_path("Mapbox token file", &defaults.paths.token),
    };

    let reference: String = Input::new()
        .with_prompt("Reference date for derived windows (YYYY-MM-DD, blank for none)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();
    let reference_date = hdb_map_dataset::transactions::parse_transaction_date(reference.trim());
    if !reference.trim().is_empty() && reference_date.is_none() {
        println!("Ignoring unparseable reference date '{}'", reference.trim());
    }

    let static_dir: String = Input::new()
        .with_prompt("Frontend directory (blank for none)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let static_dir = static_dir.trim();
    super::run_server(ServerConfig {
        paths,
        load: LoadOptions { reference_date },
        static_dir: (!static_dir.is_empty()).then(|| PathBuf::from(static_dir)),
        bind_addr,
        port,
    })
    .await
}

fn prompt_path(prompt: &str, default: &std::path::Path) -> PathBuf {
    let fallback = default.display().to_string();
    let value: String = Input::new()
        .with_prompt(prompt)
        .default(fallback.clone())
        .interact_text()
        .unwrap_or(fallback);
    PathBuf::from(value)
}
