//! Service configuration.

use genai_kit_client::GeminiClient;
use genai_kit_core::{GenAiError, Result, ValidationError};
use genai_kit_polling::PollConfig;
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the API host.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";

/// Environment variable that turns on debug logging when set to `1`.
pub const DEBUG_ENV: &str = "GEMINI_SDK_DEBUG";

/// Configuration shared by every service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// API host override.
    pub base_url: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Debug logging requested.
    pub debug: bool,
    /// Polling for video generation jobs.
    pub video_poll: PollConfig,
    /// Polling for uploaded-file processing.
    pub file_poll: PollConfig,
}

impl ServiceConfig {
    /// Create a config for `api_key`. A blank key is rejected.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(missing_key());
        }
        Ok(Self {
            api_key,
            base_url: None,
            timeout: Duration::from_secs(120),
            debug: false,
            video_poll: PollConfig::video(),
            file_poll: PollConfig::file_processing(),
        })
    }

    /// Read `GEMINI_API_KEY`, `GEMINI_BASE_URL` and `GEMINI_SDK_DEBUG`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new(lookup(API_KEY_ENV).unwrap_or_default())?;
        config.base_url = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty());
        config.debug = debug_enabled(lookup(DEBUG_ENV).as_deref());
        Ok(config)
    }

    /// Set the API host.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set video job polling.
    #[must_use]
    pub fn with_video_poll(mut self, poll: PollConfig) -> Self {
        self.video_poll = poll;
        self
    }

    /// Set file processing polling.
    #[must_use]
    pub fn with_file_poll(mut self, poll: PollConfig) -> Self {
        self.file_poll = poll;
        self
    }

    /// Request debug logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Build the HTTP client for this config.
    pub fn build_client(&self) -> Result<GeminiClient> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GenAiError::api_with_source("Failed to build HTTP client", e))?;

        let client = GeminiClient::new(&self.api_key)
            .with_client(http)
            .with_timeout(self.timeout);
        Ok(match &self.base_url {
            Some(url) => client.with_base_url(url),
            None => client,
        })
    }
}

fn missing_key() -> GenAiError {
    ValidationError::missing([API_KEY_ENV]).into()
}

/// Interpret the value of `GEMINI_SDK_DEBUG`.
#[must_use]
pub fn debug_enabled(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim),
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = ServiceConfig::new("  ").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Missing required parameters: GEMINI_API_KEY");
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::new("key").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.video_poll, PollConfig::video());
        assert_eq!(config.file_poll, PollConfig::file_processing());
        assert!(!config.debug);
    }

    #[test]
    fn test_from_lookup() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "abc"),
            (BASE_URL_ENV, "http://localhost:8080"),
            (DEBUG_ENV, "1"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert!(config.debug);
    }

    #[test]
    fn test_from_lookup_without_key() {
        let err = ServiceConfig::from_lookup(lookup(&[(DEBUG_ENV, "1")])).unwrap_err();
        assert!(err.is_validation());
    }

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some("0"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn test_debug_enabled(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(debug_enabled(value), expected);
    }

    #[test]
    fn test_build_client_uses_base_url() {
        let client = ServiceConfig::new("key")
            .unwrap()
            .with_base_url("http://localhost:9999")
            .build_client()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999");
    }
}
