//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::time::Duration;

use reqwest::Url;

use crate::error::ClientError;

/// Default base URL of the REST service.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`], then handed to
/// [`crate::api::ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every API path is appended to (e.g. `https://host/api`).
    pub api_base_url: Url,

    /// Origin prefixed to relative image paths.
    pub asset_origin: Url,

    /// Optional bearer token sent with every request.
    pub api_token: Option<String>,

    /// Idle time before a search input triggers a re-fetch.
    pub search_debounce: Duration,

    /// Page size for public item listings.
    pub page_limit: u32,

    /// Page size for the admin item table.
    pub admin_page_limit: u32,

    /// Page size for the admin history browser.
    pub history_page_limit: u32,

    /// Number of history records fetched for a single item.
    pub item_history_limit: u32,

    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// Largest photo accepted by report validation, in bytes.
    pub max_upload_bytes: u64,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `LOSTFOUND_API_BASE_URL` or
    /// `LOSTFOUND_ASSET_ORIGIN` is set but is not a valid URL.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let base = std::env::var("LOSTFOUND_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::with_base_url(&base)?;

        if let Ok(origin) = std::env::var("LOSTFOUND_ASSET_ORIGIN") {
            config.asset_origin = parse_url("LOSTFOUND_ASSET_ORIGIN", &origin)?;
        }

        config.api_token = std::env::var("LOSTFOUND_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        config.search_debounce =
            Duration::from_millis(parse_env("LOSTFOUND_SEARCH_DEBOUNCE_MS", 500));
        config.page_limit = parse_env("LOSTFOUND_PAGE_LIMIT", 10);
        config.admin_page_limit = parse_env("LOSTFOUND_ADMIN_PAGE_LIMIT", 20);
        config.history_page_limit = parse_env("LOSTFOUND_HISTORY_PAGE_LIMIT", 30);
        config.item_history_limit = parse_env("LOSTFOUND_ITEM_HISTORY_LIMIT", 50);
        config.request_timeout = match parse_env("LOSTFOUND_REQUEST_TIMEOUT_SECS", 0_u64) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        config.max_upload_bytes = parse_env("LOSTFOUND_MAX_UPLOAD_BYTES", 5 * 1024 * 1024);

        Ok(config)
    }

    /// Builds a configuration with defaults for everything but the base URL.
    ///
    /// The asset origin is derived from the base URL's scheme, host and port.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if `base` is not a valid URL.
    pub fn with_base_url(base: &str) -> Result<Self, ClientError> {
        let api_base_url = parse_url("LOSTFOUND_API_BASE_URL", base)?;
        let asset_origin = origin_of(&api_base_url)?;
        Ok(Self {
            api_base_url,
            asset_origin,
            api_token: None,
            search_debounce: Duration::from_millis(500),
            page_limit: 10,
            admin_page_limit: 20,
            history_page_limit: 30,
            item_history_limit: 50,
            request_timeout: None,
            max_upload_bytes: 5 * 1024 * 1024,
        })
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw.trim()).map_err(|e| ClientError::Config(format!("{key}: {e}")))
}

/// Strips path, query and fragment, keeping `scheme://host[:port]`.
fn origin_of(url: &Url) -> Result<Url, ClientError> {
    let origin = url.origin().ascii_serialization();
    Url::parse(&origin).map_err(|e| ClientError::Config(format!("asset origin: {e}")))
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn asset_origin_drops_api_path() {
        let Ok(config) = ClientConfig::with_base_url("https://lost.example.com:8443/api/v1") else {
            panic!("valid url");
        };
        assert_eq!(config.asset_origin.as_str(), "https://lost.example.com:8443/");
        assert_eq!(config.api_base_url.path(), "/api/v1");
    }

    #[test]
    fn defaults_match_listing_behaviour() {
        let Ok(config) = ClientConfig::with_base_url(DEFAULT_API_BASE_URL) else {
            panic!("valid url");
        };
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.history_page_limit, 30);
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = ClientConfig::with_base_url("not a url");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
