//! Client configuration

use std::time::Duration;

/// Default quiet period before a typed search is issued
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;
/// Default number of free matches shown per picker page
pub const DEFAULT_PICKER_PAGE_SIZE: u32 = 20;
/// Default number of draft rows shown per page
pub const DEFAULT_DRAFT_PAGE_SIZE: u32 = 10;

/// Configuration for a manifest authoring client
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | MANIFEST_API_URL | http://localhost:8080 | 后端 API 地址 |
/// | MANIFEST_API_TOKEN | - | Bearer token |
/// | MANIFEST_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | MANIFEST_SEARCH_DEBOUNCE_MS | 300 | 搜索防抖(毫秒) |
/// | MANIFEST_PICKER_PAGE_SIZE | 20 | 选择器每页数量 |
/// | MANIFEST_DRAFT_PAGE_SIZE | 10 | 草稿每页数量 |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Bearer token for authentication
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Search debounce in milliseconds
    pub search_debounce_ms: u64,

    /// Picker page size
    pub picker_page_size: u32,

    /// Draft page size
    pub draft_page_size: u32,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: 30,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            picker_page_size: DEFAULT_PICKER_PAGE_SIZE,
            draft_page_size: DEFAULT_DRAFT_PAGE_SIZE,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("MANIFEST_API_URL").unwrap_or(defaults.base_url),
            token: std::env::var("MANIFEST_API_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout: std::env::var("MANIFEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            search_debounce_ms: std::env::var("MANIFEST_SEARCH_DEBOUNCE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
            picker_page_size: std::env::var("MANIFEST_PICKER_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.picker_page_size),
            draft_page_size: std::env::var("MANIFEST_DRAFT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.draft_page_size),
        }
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the search debounce
    pub fn with_search_debounce(mut self, millis: u64) -> Self {
        self.search_debounce_ms = millis;
        self
    }

    /// Set the picker page size (minimum 1)
    pub fn with_picker_page_size(mut self, size: u32) -> Self {
        self.picker_page_size = size.max(1);
        self
    }

    /// Set the draft page size (minimum 1)
    pub fn with_draft_page_size(mut self, size: u32) -> Self {
        self.draft_page_size = size.max(1);
        self
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ClientConfig::new("http://api.local")
            .with_token("abc")
            .with_timeout(5)
            .with_search_debounce(0)
            .with_picker_page_size(0)
            .with_draft_page_size(25);

        assert_eq!(config.base_url, "http://api.local");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.search_debounce(), Duration::ZERO);
        assert_eq!(config.picker_page_size, 1);
        assert_eq!(config.draft_page_size, 25);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.search_debounce_ms, DEFAULT_SEARCH_DEBOUNCE_MS);
        assert_eq!(config.picker_page_size, DEFAULT_PICKER_PAGE_SIZE);
        assert!(config.token.is_none());
    }
}
