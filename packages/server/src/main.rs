#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HDB block map server binary.
//!
//! ```text
//! hdb_map_server serve [--aggregate <csv>] [--transactions <csv>]
//!                      [--token-file <path>] [--reference-date <date>]
//!                      [--static-dir <dir>]
//! hdb_map_server interactive
//! ```
//!
//! Running with no subcommand enters interactive mode. `BIND_ADDR` and
//! `PORT` select the listen address.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hdb_map_dataset::{DataPaths, LoadOptions};
use hdb_map_server::ServerConfig;

#[derive(Parser)]
#[command(name = "hdb_map_server", about = "Serve the HDB block map")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the datasets and start the server
    Serve(ServeArgs),
    /// Prompt for configuration, then start the server
    Interactive,
}

#[derive(Args)]
struct ServeArgs {
    /// Per-block aggregate CSV
    #[arg(long)]
    aggregate: Option<PathBuf>,
    /// Per-sale transaction CSV
    #[arg(long)]
    transactions: Option<PathBuf>,
    /// File holding the Mapbox access token
    #[arg(long)]
    token_file: Option<PathBuf>,
    /// Date time windows are measured back from, used when the transaction
    /// table has no window membership columns (YYYY-MM-DD or YYYY-MM)
    #[arg(long, value_parser = parse_reference_date)]
    reference_date: Option<NaiveDate>,
    /// Directory of frontend assets to serve at `/`
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let defaults = DataPaths::default();
        let paths = DataPaths {
            aggregate: self.aggregate.unwrap_or(defaults.aggregate),
            transactions: self.transactions.unwrap_or(defaults.transactions),
            token: self.token_file.unwrap_or(defaults.token),
        };
        let load = LoadOptions {
            reference_date: self.reference_date,
        };
        ServerConfig::from_env(paths, load, self.static_dir)
    }
}

fn parse_reference_date(raw: &str) -> Result<NaiveDate, String> {
    hdb_map_dataset::transactions::parse_transaction_date(raw)
        .ok_or_else(|| format!("expected YYYY-MM-DD or YYYY-MM, got '{raw}'"))
}

#[actix_web::main]
async fn main() -> ExitCode {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Interactive) => hdb_map_server::interactive::run().await,
        Some(Commands::Serve(args)) => hdb_map_server::run_server(args.into_config()).await,
    };

    if let Err(e) = result {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
