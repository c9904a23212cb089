use crate::core::{CondoError, Result};
use crate::optimistic::{ControllerOptions, ReconcilePolicy};
use std::env;
use std::time::Duration;

/// Highlight duration observed on the dashboards.
pub const DEFAULT_HIGHLIGHT_TTL: Duration = Duration::from_millis(3000);

/// Application configuration
///
/// Loaded from the environment (optionally through a `.env` file) and
/// adjustable with builder-style setters.
#[derive(Debug, Clone)]
pub struct CondoConfig {
    /// Address the HTTP server binds to
    pub host: String,

    /// Port the HTTP server binds to
    pub port: u16,

    /// How long a highlighted row stays flagged
    pub highlight_ttl: Duration,

    /// Which pending edits survive a refresh
    pub reconcile_policy: ReconcilePolicy,

    /// Re-fetch the authoritative collection after every confirmed edit
    pub refresh_after_success: bool,
}

impl Default for CondoConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            highlight_ttl: DEFAULT_HIGHLIGHT_TTL,
            reconcile_policy: ReconcilePolicy::RefreshWins,
            refresh_after_success: false,
        }
    }
}

impl CondoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `CONDO_*` variables, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CondoConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("CONDO_HOST").unwrap_or(defaults.host);

        let port = match lookup("CONDO_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| {
                    CondoError::Config(format!("CONDO_PORT must be a valid u16, got '{raw}'"))
                })?,
            None => defaults.port,
        };

        let highlight_ttl = match lookup("CONDO_HIGHLIGHT_TTL_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse::<u64>().map_err(|_| {
                CondoError::Config(format!(
                    "CONDO_HIGHLIGHT_TTL_MS must be a number of milliseconds, got '{raw}'"
                ))
            })?),
            None => defaults.highlight_ttl,
        };

        let reconcile_policy = match lookup("CONDO_RECONCILE_POLICY") {
            Some(raw) => raw.parse::<ReconcilePolicy>()?,
            None => defaults.reconcile_policy,
        };

        let refresh_after_success = match lookup("CONDO_REFRESH_AFTER_SUCCESS") {
            Some(raw) => parse_bool("CONDO_REFRESH_AFTER_SUCCESS", &raw)?,
            None => defaults.refresh_after_success,
        };

        Ok(Self {
            host,
            port,
            highlight_ttl,
            reconcile_policy,
            refresh_after_success,
        })
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the highlight duration
    pub fn highlight_ttl(mut self, ttl: Duration) -> Self {
        self.highlight_ttl = ttl;
        self
    }

    /// Set the reconcile policy
    pub fn reconcile_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile_policy = policy;
        self
    }

    /// Refresh after every confirmed edit
    pub fn refresh_after_success(mut self, enabled: bool) -> Self {
        self.refresh_after_success = enabled;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            policy: self.reconcile_policy,
            refresh_after_success: self.refresh_after_success,
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CondoError::Config(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}
