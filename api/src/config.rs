use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const BASE_URL_VAR: &str = "HANDBALL_API_URL";
pub const TIMEOUT_VAR: &str = "HANDBALL_API_TIMEOUT_SECS";

/// Where and how the client talks to the league API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// No timeout unless one is configured explicitly.
    pub timeout: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout: None }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: normalize_base(&base_url.into()), timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read `HANDBALL_API_URL` and `HANDBALL_API_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeout = lookup(TIMEOUT_VAR)
            .and_then(|secs| secs.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self { base_url: normalize_base(&base_url), timeout }
    }

    /// `{base}/{path}` with exactly one slash between the two.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}
