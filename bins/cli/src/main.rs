//! notedrop
//!
//! Command-line entry point: attach files to a note, upload or download
//! every embed in a note, or rotate the naming seed.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notedrop_shared::AppError;

mod cli;
mod commands;
mod document;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    let default_filter = if cli.verbose {
        "notedrop=debug"
    } else {
        "notedrop=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match commands::run_command(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let app = err.downcast_ref::<AppError>();
            let code = app.map_or("ERROR", AppError::error_code);
            eprintln!("error[{code}]: {err:#}");
            ExitCode::from(app.map_or(1, AppError::exit_code))
        }
    }
}
