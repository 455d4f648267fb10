//! Configuration module
//!
//! Settings shared by every command: where the service lives and how the
//! status poller behaves.

use anyhow::Context;
use std::time::Duration;
use stepcut_client::ServiceClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the conversion service
    pub api_base: String,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Delay between two job status fetches
    pub poll_interval: Duration,

    /// Consecutive failed fetches before `watch` gives up (`None` = never)
    pub max_poll_failures: Option<u32>,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base.is_empty() {
            anyhow::bail!("api_base cannot be empty");
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            anyhow::bail!("api_base must start with http:// or https://");
        }

        if self.request_timeout.is_zero() {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_poll_failures == Some(0) {
            anyhow::bail!("max_poll_failures must be greater than 0 when set");
        }

        Ok(())
    }

    /// Builds a service client honouring the request timeout
    pub fn client(&self) -> anyhow::Result<ServiceClient> {
        let http = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ServiceClient::with_client(&self.api_base, http))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8787".to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: stepcut_client::DEFAULT_POLL_INTERVAL,
            max_poll_failures: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.max_poll_failures, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        config.api_base = "localhost:8787".to_string();
        assert!(config.validate().is_err());

        config.api_base = "https://convert.example.com".to_string();
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_millis(500);

        config.max_poll_failures = Some(0);
        assert!(config.validate().is_err());
        config.max_poll_failures = Some(20);
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
