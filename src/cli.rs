// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every option can also come from an environment variable (clap's `env`
// feature), and main() loads a `.env` file first, so the access token never
// has to appear on the command line.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - From<Cli> for Config: turning raw arguments into validated settings
// =============================================================================

use crate::config::{
    Config, DEFAULT_BASE_URL, DEFAULT_OUTPUT, DEFAULT_PER_PAGE, DEFAULT_TIMEOUT_SECS,
};
use crate::qiita::{Sort, Termination};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

// The whole CLI is a single command: fetch every tag, write one CSV
#[derive(Parser)]
#[command(
    name = "qiita-tag-export",
    version,
    about = "Export every Qiita tag into a CSV file",
    long_about = "qiita-tag-export pages through GET /tags of the Qiita v2 API and writes \
                  followers_count, icon_url, id and items_count of every tag to a CSV file. \
                  The file is rewritten from scratch on every run."
)]
pub struct Cli {
    /// API root the /tags path is appended to
    #[arg(long, env = "QIITA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Access token sent as `Authorization: Bearer <token>`
    #[arg(long, env = "QIITA_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Tags per request (the API allows at most 100)
    #[arg(long, env = "QIITA_PER_PAGE", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    /// Sort order requested from the API
    #[arg(long, env = "QIITA_SORT", value_enum, default_value_t = Sort::Count)]
    pub sort: Sort,

    /// CSV file to (over)write
    #[arg(short, long, env = "QIITA_TAGS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "QIITA_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Keep paging until a page comes back short instead of trusting Total-Count
    #[arg(long)]
    pub until_short_page: bool,

    /// Log level (RUST_LOG can still narrow it down per module)
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

// Hand-written so the token never shows up in debug output
impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("per_page", &self.per_page)
            .field("sort", &self.sort)
            .field("output", &self.output)
            .field("timeout_secs", &self.timeout_secs)
            .field("until_short_page", &self.until_short_page)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let termination = if cli.until_short_page {
            Termination::ShortPage
        } else {
            Termination::TotalCount
        };

        let mut config = Config::new(cli.token);
        config.base_url = cli.base_url;
        config.per_page = cli.per_page;
        config.sort = cli.sort;
        config.output = cli.output;
        config.timeout = Duration::from_secs(cli.timeout_secs);
        config.termination = termination;
        config
    }
}
