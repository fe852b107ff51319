// src/config.rs
// =============================================================================
// Settings for the reachability checker.
//
// The CLI only takes the page URL, so tuning knobs come from environment
// variables instead of flags:
//
//   LINK_SCAN_TIMEOUT_SECS     per-request timeout           (default 10)
//   LINK_SCAN_MAX_REDIRECTS    redirects followed per probe  (default 5)
//   LINK_SCAN_CONCURRENCY      probes in flight at once      (default 50)
//   LINK_SCAN_NETWORK_ERRORS   "invalid" or "unknown"        (default invalid)
//   LINK_SCAN_USER_AGENT       User-Agent header for probes
//
// A variable that is set but can't be parsed is a fatal error. Silently
// falling back to a default would hide typos.
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const TIMEOUT_VAR: &str = "LINK_SCAN_TIMEOUT_SECS";
pub const MAX_REDIRECTS_VAR: &str = "LINK_SCAN_MAX_REDIRECTS";
pub const CONCURRENCY_VAR: &str = "LINK_SCAN_CONCURRENCY";
pub const NETWORK_ERRORS_VAR: &str = "LINK_SCAN_NETWORK_ERRORS";
pub const USER_AGENT_VAR: &str = "LINK_SCAN_USER_AGENT";

/// How to classify a probe that failed below HTTP (DNS, refused
/// connection, TLS, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkErrorPolicy {
    /// Report the link as broken.
    #[default]
    Invalid,
    /// Report the link as inconclusive, separately from broken links.
    Unknown,
}

impl FromStr for NetworkErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invalid" => Ok(Self::Invalid),
            "unknown" => Ok(Self::Unknown),
            other => Err(anyhow!("expected 'invalid' or 'unknown', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub timeout: Duration,
    pub max_redirects: usize,
    pub concurrency: usize,
    pub network_errors: NetworkErrorPolicy,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_redirects: 5,
            concurrency: 50,
            network_errors: NetworkErrorPolicy::Invalid,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CheckerConfig {
    /// Defaults, overridden by any `LINK_SCAN_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // Separate from from_env so tests don't have to mutate the process
    // environment
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64>(&lookup, TIMEOUT_VAR)? {
            if secs == 0 {
                bail!("{} must be at least 1", TIMEOUT_VAR);
            }
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(max) = parse_var::<usize>(&lookup, MAX_REDIRECTS_VAR)? {
            config.max_redirects = max;
        }

        if let Some(concurrency) = parse_var::<usize>(&lookup, CONCURRENCY_VAR)? {
            if concurrency == 0 {
                bail!("{} must be at least 1", CONCURRENCY_VAR);
            }
            config.concurrency = concurrency;
        }

        if let Some(policy) = parse_var::<NetworkErrorPolicy>(&lookup, NETWORK_ERRORS_VAR)? {
            config.network_errors = policy;
        }

        if let Some(agent) = lookup(USER_AGENT_VAR) {
            config.user_agent = agent;
        }

        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", value, name)),
    }
}
