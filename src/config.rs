// Runtime configuration for invoice-probe
// Resolved once at startup from the environment and passed down explicitly

use std::fmt;
use std::time::Duration;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_JWT_SECRET: &str = "secreto_todavia_mas_seguro";

/// Per-request timeout. A request that exceeds it fails like any other transport error.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ProbeConfig {
    pub base_url: String,
    pub jwt_secret: String,
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn new(base_url: &str, jwt_secret: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            jwt_secret: jwt_secret.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Build the configuration from `BACKEND_URL` and `JWT_SECRET`,
    /// falling back to the local defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ProbeConfig::from_env`] but with an injectable lookup, so
    /// tests never have to mutate the process environment.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self::new(
            &read(BACKEND_URL_VAR, DEFAULT_BACKEND_URL),
            &read(JWT_SECRET_VAR, DEFAULT_JWT_SECRET),
        )
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join the base URL with an absolute path such as `/invoices`.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL, DEFAULT_JWT_SECRET)
    }
}

impl fmt::Debug for ProbeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeConfig")
            .field("base_url", &self.base_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
