//! Configuration management for zdesk.
//!
//! Credentials live in the OS keychain (see [`crate::identity`]); this module
//! only covers where the remote API is reached, loaded from environment
//! variables (or a `.env` file) with validation.

use crate::error::ZdeskError;
use std::env;

/// Default host suffix appended to the organization domain.
pub const DEFAULT_API_HOST: &str = "zendesk.com";

/// Remote endpoint configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host suffix, e.g. `zendesk.com` for `https://acme.zendesk.com`.
    pub api_host: String,

    /// Full base URL that replaces `https://{domain}.{api_host}` when set.
    pub base_url_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            base_url_override: None,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Optional Environment Variables
    ///
    /// - `ZDESK_BASE_URL`: Full base URL override (proxies, local testing)
    /// - `ZDESK_API_HOST`: Host suffix, defaults to `zendesk.com`
    ///
    /// # Errors
    ///
    /// Returns `ZdeskError::Config` if a value fails validation.
    pub fn from_env() -> Result<Self, ZdeskError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ZdeskError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_host = match read("ZDESK_API_HOST") {
            Some(host) => Self::validate_api_host(host)?,
            None => DEFAULT_API_HOST.to_string(),
        };

        // Full override wins over the host suffix in base_url_for
        let base_url_override = read("ZDESK_BASE_URL")
            .map(Self::validate_base_url)
            .transpose()?;

        Ok(Config {
            api_host,
            base_url_override,
        })
    }

    /// Returns the API base URL for an organization domain.
    pub fn base_url_for(&self, domain: &str) -> String {
        match &self.base_url_override {
            Some(url) => url.clone(),
            None => format!("https://{}.{}", domain, self.api_host),
        }
    }

    /// Validates and normalizes the base URL.
    fn validate_base_url(url: String) -> Result<String, ZdeskError> {
        // Remove trailing slash for consistency
        let url = url.trim().trim_end_matches('/').to_string();

        // Validate base URL format
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ZdeskError::invalid_config(
                "ZDESK_BASE_URL must start with http:// or https://",
            ));
        }

        url::Url::parse(&url)
            .map_err(|e| ZdeskError::invalid_config(format!("ZDESK_BASE_URL is invalid: {}", e)))?;

        Ok(url)
    }

    /// Validates the host suffix is a bare host name.
    fn validate_api_host(host: String) -> Result<String, ZdeskError> {
        // Accept ".zendesk.com" and "Zendesk.com." alike
        let host = host.trim().trim_matches('.').to_lowercase();
        let valid = !host.is_empty()
            && host
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid {
            return Err(ZdeskError::invalid_config(
                "ZDESK_API_HOST must be a host name such as zendesk.com",
            ));
        }
        Ok(host)
    }
}
