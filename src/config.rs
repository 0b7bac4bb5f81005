//! Client configuration loaded from the environment.

use std::time::Duration;

use anyhow::{Context, Result, bail};

pub const API_URL_ENV: &str = "LIVETAKEOFF_API_URL";
pub const TIMEOUT_ENV: &str = "LIVETAKEOFF_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV: &str = "LIVETAKEOFF_CONNECT_TIMEOUT_SECS";
pub const REFRESH_POLICY_ENV: &str = "LIVETAKEOFF_REFRESH_POLICY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// How concurrent calls that all hit an expired access token refresh it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Every rejected call runs its own refresh; the last stored token wins.
    #[default]
    Independent,
    /// Refreshes are serialised and a caller reuses a token another caller
    /// stored while it was waiting. When the refresh fails, only the call that
    /// ran it expires the session; callers that were waiting find the tokens
    /// cleared and fail with `SessionExpired` without notifying or navigating
    /// again.
    SingleFlight,
}

impl std::str::FromStr for RefreshPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "single-flight" | "single_flight" | "singleflight" => Ok(Self::SingleFlight),
            other => bail!("unknown refresh policy '{other}' (expected 'independent' or 'single-flight')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every request path is appended to, without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub refresh_policy: RefreshPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            refresh_policy: RefreshPolicy::default(),
        }
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{API_URL_ENV} must be set"))?;
        reqwest::Url::parse(base_url.trim())
            .with_context(|| format!("{API_URL_ENV} is not a valid URL: {base_url}"))?;

        let mut config = Self::new(base_url.trim());

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config.timeout = parse_secs(TIMEOUT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_ENV) {
            config.connect_timeout = parse_secs(CONNECT_TIMEOUT_ENV, &raw)?;
        }
        if let Some(raw) = lookup(REFRESH_POLICY_ENV) {
            config.refresh_policy = raw.parse()?;
        }

        Ok(config)
    }

    /// Joins `path` onto the base endpoint.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'"))?;
    if secs == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
