use std::time::Duration;

use engenha_db::gateway::GatewayConfig;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SITE_URL: &str = "http://localhost:8080";
pub const DEFAULT_AUTH_REDIRECT_DELAY_MS: u64 = 2000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Hosted backend project URL.
    pub gateway_url: String,
    /// Public API key of the hosted backend.
    pub anon_key: String,
    pub request_timeout: Duration,
    /// Public URL of the dashboard, used to build redirect links.
    pub site_url: String,
    /// Pause between a successful auth callback and the redirect.
    pub auth_redirect_delay: Duration,
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                  | Default                 |
    /// |--------------------------|-------------------------|
    /// | `ENGENHA_GATEWAY_URL`    | required                |
    /// | `ENGENHA_ANON_KEY`       | required                |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                    |
    /// | `SITE_URL`               | `http://localhost:8080` |
    /// | `AUTH_REDIRECT_DELAY_MS` | `2000`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let number = |name: &'static str, default: u64| match lookup(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name,
                expected: "a non-negative integer",
                value: raw,
            }),
        };

        let gateway_url = required("ENGENHA_GATEWAY_URL")?;
        if !gateway_url.starts_with("http://") && !gateway_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "ENGENHA_GATEWAY_URL",
                expected: "an http(s) URL",
                value: gateway_url,
            });
        }
        let anon_key = required("ENGENHA_ANON_KEY")?;
        let request_timeout_secs = number("REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let redirect_delay_ms = number("AUTH_REDIRECT_DELAY_MS", DEFAULT_AUTH_REDIRECT_DELAY_MS)?;
        let site_url = lookup("SITE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        Ok(Self {
            gateway_url,
            anon_key,
            request_timeout: Duration::from_secs(request_timeout_secs),
            site_url,
            auth_redirect_delay: Duration::from_millis(redirect_delay_ms),
        })
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.gateway_url.clone(),
            anon_key: self.anon_key.clone(),
            timeout: self.request_timeout,
        }
    }
}
