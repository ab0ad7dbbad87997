//! Endpoint configuration for the FPS REST API and Co-Branded UI.

use serde::{Deserialize, Serialize};

/// Configuration for the FPS API endpoints.
///
/// Amazon runs separate sandbox and production environments; the two presets
/// carry the published URLs for each. The CBUI URL is the browser-redirect
/// entry point used by [`FlexPayClient::cbui_url`](crate::FlexPayClient::cbui_url).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// REST API endpoint URL (e.g. `https://fps.sandbox.amazonaws.com/`).
    pub api_url: String,

    /// Co-Branded UI pipeline entry URL.
    pub cbui_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ApiConfig {
    /// Create a configuration with explicit endpoint URLs.
    pub fn new(api_url: impl Into<String>, cbui_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            cbui_url: cbui_url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Create config for the FPS sandbox environment.
    pub fn sandbox() -> Self {
        Self::new(
            "https://fps.sandbox.amazonaws.com/",
            "https://authorize.payments-sandbox.amazon.com/cobranded-ui/actions/start",
        )
    }

    /// Create config for the FPS production environment.
    pub fn production() -> Self {
        Self::new(
            "https://fps.amazonaws.com/",
            "https://authorize.payments.amazon.com/cobranded-ui/actions/start",
        )
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let sandbox = ApiConfig::sandbox();
        assert!(sandbox.api_url.contains("sandbox"));
        assert!(sandbox.cbui_url.contains("payments-sandbox"));

        let production = ApiConfig::production();
        assert!(!production.api_url.contains("sandbox"));
        assert_eq!(production.timeout_secs, 30);
    }

    #[test]
    fn test_with_timeout() {
        let config = ApiConfig::sandbox().with_timeout(60);
        assert_eq!(config.timeout_secs, 60);
    }
}
