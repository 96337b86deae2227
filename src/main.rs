// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Load .env, parse command-line arguments, set up logging
// 2. Build the API client from the validated configuration
// 3. Fetch every page of tags (Ctrl-C cancels the in-flight request)
// 4. Write the tags to the CSV file
// 5. Exit with proper code (0 = success, 1 = error)
//
// An empty or shortened tag list (the API rejected a page) still counts as
// success; only real failures exit with 1.
// =============================================================================

mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated run settings
mod error; // src/error.rs - error enum shared by everything below
mod output; // src/output/ - CSV export
mod qiita; // src/qiita/ - API client and pagination

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Config;
use log::{debug, error, info, warn, LevelFilter};
use qiita::{QiitaClient, TagPaginator};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Must happen before parsing so clap's env fallbacks can see the values
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logger(cli.log_level);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole cause chain on one line
            error!("{:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    info!("start");

    let config = Config::from(cli);
    config.validate()?;
    debug!("{:?}", config);

    let client = QiitaClient::new(&config)?;
    info!(
        "fetching tags from {} ({} per page)",
        client.base_url(),
        config.per_page
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let tags = TagPaginator::new(&client, &config)
        .fetch_all(&cancel)
        .await
        .context("failed to fetch tags")?;

    output::write_tags(&config.output, &tags).context("failed to export tags")?;

    info!("end");
    Ok(())
}

// Cancels `cancel` on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling the current request");
            cancel.cancel();
        }
    });
}

// Level from --log-level, then RUST_LOG on top for per-module tweaks
fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("rustls", LevelFilter::Warn)
        .parse_env("RUST_LOG")
        .format_timestamp_secs()
        .init();
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why return an exit code instead of panicking?
//    - Scheduled jobs (cron, CI) only look at the exit status
//    - error!() leaves a readable line in the job log before we exit
//
// 2. Why a CancellationToken?
//    - Requests run one after another, so there is only ever one in flight
//    - Cancelling the token makes that request fail right away instead of
//      waiting for the timeout, and nothing gets written to the CSV file
// -----------------------------------------------------------------------------
