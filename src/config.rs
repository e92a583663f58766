//! Client configuration resolved from CLI flags and environment.
//!
//! Precedence: flag > `BIGTABLE_ADMIN_*` env > built-in default. The access
//! token additionally falls back to `GOOGLE_OAUTH_ACCESS_TOKEN`.

use std::time::Duration;
use url::Url;

use crate::admin::AdminError;

pub const DEFAULT_ENDPOINT: &str = "https://bigtableadmin.googleapis.com/";
pub const ENDPOINT_ENV: &str = "BIGTABLE_ADMIN_ENDPOINT";
pub const TOKEN_ENV: &str = "BIGTABLE_ADMIN_ACCESS_TOKEN";
pub const GOOGLE_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoint: Url,
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub max_polls: u32,
    /// Honour `HTTP(S)_PROXY` from the environment.
    pub use_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid url"),
            access_token: None,
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1000),
            max_polls: 60,
            use_proxy: true,
        }
    }
}

/// Raw settings as they come off the command line.
#[derive(Debug, Clone, Default)]
pub struct ClientFlags {
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_polls: Option<u32>,
    pub no_proxy: bool,
}

impl ClientOptions {
    /// Resolve options against the process environment.
    pub fn resolve(flags: ClientFlags) -> Result<Self, AdminError> {
        Self::resolve_with(flags, |key| std::env::var(key).ok())
    }

    /// Resolve options using `lookup` for environment access.
    pub fn resolve_with(
        flags: ClientFlags,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AdminError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let defaults = Self::default();

        let endpoint = match non_empty(flags.endpoint).or_else(|| non_empty(lookup(ENDPOINT_ENV))) {
            Some(raw) => parse_endpoint(&raw)?,
            None => defaults.endpoint,
        };

        let access_token = non_empty(flags.access_token)
            .or_else(|| non_empty(lookup(TOKEN_ENV)))
            .or_else(|| non_empty(lookup(GOOGLE_TOKEN_ENV)))
            .map(|t| t.trim().to_string());

        Ok(Self {
            endpoint,
            access_token,
            timeout: flags
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            poll_interval: flags
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_polls: flags.max_polls.unwrap_or(defaults.max_polls).max(1),
            use_proxy: !flags.no_proxy,
        })
    }
}

/// Parse an admin endpoint. Only http/https are accepted; the path always ends
/// with `/` so relative joins keep it.
pub fn parse_endpoint(raw: &str) -> Result<Url, AdminError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AdminError::InvalidEndpoint("endpoint is empty".into()));
    }
    let mut url =
        Url::parse(trimmed).map_err(|e| AdminError::InvalidEndpoint(format!("'{trimmed}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AdminError::InvalidEndpoint(format!(
                "unsupported scheme '{other}' in '{trimmed}'"
            )));
        }
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
