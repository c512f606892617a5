//! Provider configuration supplied by the host.
//!
//! The host hands the provider a configuration object during its configure
//! call; the provider never reads process environment variables for
//! connection settings.

use serde::Deserialize;
use url::Url;

use crate::error::{ProviderError, Result};

fn default_timeout_secs() -> u64 {
    30
}

/// Provider configuration
#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the Nexus server, e.g. `https://nexus.example.com`
    pub url: String,

    /// Basic-auth username
    pub username: String,

    /// Basic-auth password
    pub password: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional PEM-encoded root certificate to trust
    #[serde(default)]
    pub ca_certificate: Option<String>,

    /// Skip TLS certificate verification (self-signed test servers only)
    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

redacted_debug!(ProviderConfig {
    show url,
    show username,
    redact password,
    show timeout_secs,
    show insecure_skip_tls_verify,
});

impl ProviderConfig {
    /// Parse and validate the host-supplied configuration value.
    pub fn from_host_value(raw: &serde_json::Value) -> Result<Self> {
        let config: ProviderConfig = serde_json::from_value(raw.clone())
            .map_err(|e| ProviderError::validation(format!("invalid provider config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.url)
            .map_err(|e| ProviderError::validation_at("url", format!("not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::validation_at(
                "url",
                format!("scheme must be http or https, got {}", parsed.scheme()),
            ));
        }
        if self.username.is_empty() {
            return Err(ProviderError::validation_at("username", "must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ProviderError::validation_at(
                "timeout_secs",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed, the form every endpoint
    /// path is appended to.
    pub fn base_url(&self) -> String {
        self.url.trim_end_matches('/').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_parses_and_defaults_timeout() {
        let config = ProviderConfig::from_host_value(&json!({
            "url": "https://nexus.example.com",
            "username": "admin",
            "password": "admin123"
        }))
        .expect("config should parse");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.base_url(), "https://nexus.example.com");
    }

    #[test]
    fn test_config_rejects_non_http_scheme() {
        let err = ProviderConfig::from_host_value(&json!({
            "url": "ftp://nexus.example.com",
            "username": "admin",
            "password": "admin123"
        }))
        .unwrap_err();
        match err {
            ProviderError::Validation { path, .. } => {
                assert_eq!(path.as_deref(), Some("url"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = ProviderConfig::from_host_value(&json!({
            "url": "https://nexus.example.com",
            "username": "admin",
            "password": "hunter2"
        }))
        .unwrap();
        let output = format!("{config:?}");
        assert!(!output.contains("hunter2"), "password must not leak");
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let config = ProviderConfig::from_host_value(&json!({
            "url": "https://nexus.example.com/",
            "username": "admin",
            "password": "x"
        }))
        .unwrap();
        assert_eq!(config.base_url(), "https://nexus.example.com");
    }
}
