use std::cell::RefCell;

use wasm_bindgen::prelude::*;

use crate::constants::DEFAULT_API_BASE;

/// API route configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl Default for ApiConfig {
    /// Same-origin `/api`, which is where the server-rendered pages expect
    /// the REST endpoints unless a build or the page says otherwise.
    fn default() -> Self {
        Self::from_url(DEFAULT_API_BASE)
    }
}

impl ApiConfig {
    /// Build-time override through the `API_BASE_URL` environment variable,
    /// falling back to the same-origin default.
    pub fn new() -> Self {
        match option_env!("API_BASE_URL") {
            Some(url) if !url.is_empty() => Self::from_url(url),
            _ => Self::default(),
        }
    }

    /// Create a new ApiConfig from a URL string
    pub fn from_url(url: &str) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL for all API calls
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base with a relative endpoint such as `/voting/stats`.
    /// Absolute URLs pass through unchanged.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

thread_local! {
    static RUNTIME_BASE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Runtime override set from JS before the dashboard mounts, e.g.
/// `init_api_config_js("https://example.org/api")`.
#[wasm_bindgen]
pub fn init_api_config_js(base_url: &str) {
    RUNTIME_BASE.with(|b| *b.borrow_mut() = Some(base_url.to_string()));
}

/// Effective configuration: runtime override first, then build time, then
/// the same-origin default.
pub fn current_config() -> ApiConfig {
    RUNTIME_BASE
        .with(|b| b.borrow().clone())
        .map(|url| ApiConfig::from_url(&url))
        .unwrap_or_else(ApiConfig::new)
}
