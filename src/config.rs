// src/config.rs
// =============================================================================
// Run configuration.
//
// The CLI layer (src/cli.rs) applies defaults and reads environment
// variables; everything after that only ever sees this struct, which is
// passed explicitly into the API client and the paginator.
// =============================================================================

use crate::error::{Error, Result};
use crate::qiita::{Sort, Termination, MAX_PER_PAGE};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://qiita.com/api/v2";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_OUTPUT: &str = "/tmp/qiita_tags.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything one export run needs to know.
#[derive(Clone)]
pub struct Config {
    /// Absolute API root, e.g. https://qiita.com/api/v2
    pub base_url: String,
    /// Bearer token sent with every request
    pub token: String,
    /// Page size for every request (1..=100)
    pub per_page: u32,
    pub sort: Sort,
    /// CSV destination, truncated on every run
    pub output: PathBuf,
    /// Per-request timeout
    pub timeout: Duration,
    pub termination: Termination,
}

impl Config {
    // Defaults for everything except the token, which has no sensible default
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            per_page: DEFAULT_PER_PAGE,
            sort: Sort::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            termination: Termination::default(),
        }
    }

    // Range checks that don't need the network.
    // The base URL and token are checked when the client is built.
    pub fn validate(&self) -> Result<()> {
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(Error::Configuration(format!(
                "per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE, self.per_page
            )));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// Hand-written so the token never ends up in a log line
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("per_page", &self.per_page)
            .field("sort", &self.sort)
            .field("output", &self.output)
            .field("timeout", &self.timeout)
            .field("termination", &self.termination)
            .finish()
    }
}
