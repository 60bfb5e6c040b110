use crate::models::Channel;
use std::time::Duration;

/// Used when no service URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://churnprediction-rsrs.onrender.com";

/// Long enough for a free-tier host to wake from sleep.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the prediction service, without trailing slash.
    pub base_url: String,
    pub request_timeout: Duration,
    /// Channel applied when the form leaves it blank.
    pub default_channel: Channel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_channel: Channel::Web,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            base_url: match lookup("CHURN_API_URL").or_else(|| lookup("BACKEND_URL")) {
                Some(url) => validate_base_url(&url)?,
                None => {
                    tracing::info!("CHURN_API_URL not set, falling back to {}", DEFAULT_BASE_URL);
                    DEFAULT_BASE_URL.to_string()
                }
            },
            request_timeout: lookup("CHURN_API_TIMEOUT_SECS")
                .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    anyhow::anyhow!("CHURN_API_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            default_channel: lookup("CHURN_DEFAULT_CHANNEL")
                .unwrap_or_else(|| Channel::Web.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("CHURN_DEFAULT_CHANNEL invalid: {}", e))?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Prediction service URL: {}", config.base_url);
        tracing::debug!("Request timeout: {}s", config.request_timeout.as_secs());
        tracing::debug!("Default channel: {}", config.default_channel);

        Ok(config)
    }
}

/// Checks a service URL and strips any trailing slash.
pub fn validate_base_url(raw: &str) -> anyhow::Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        anyhow::bail!("CHURN_API_URL cannot be empty");
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("CHURN_API_URL must start with http:// or https://");
    }
    url::Url::parse(url)
        .map_err(|e| anyhow::anyhow!("CHURN_API_URL is not a valid URL: {}", e))?;

    Ok(url.trim_end_matches('/').to_string())
}
