use std::str::FromStr;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// User agent sent when none is configured. Some archive hosts refuse
/// requests that carry a library default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Proxies by URL scheme, written as `http=URL,https=URL`.
///
/// # Examples
///
/// ```
/// use unfurl_fetch::ProxyConfig;
///
/// let proxy: ProxyConfig = "http=http://proxy:3128,https=http://proxy:3129".parse().unwrap();
/// assert_eq!(proxy.http.as_deref(), Some("http://proxy:3128"));
/// assert_eq!(proxy.https.as_deref(), Some("http://proxy:3129"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
    /// Used for any scheme without its own entry.
    pub all: Option<String>,
}

impl ProxyConfig {
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |reason: &str| FetchError::InvalidProxy {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut config = Self::default();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (scheme, url) = pair
                .split_once('=')
                .ok_or_else(|| invalid("expected scheme=url"))?;
            let url = url.trim();
            if url.is_empty() {
                return Err(invalid("empty proxy url"));
            }
            let slot = match scheme.trim().to_ascii_lowercase().as_str() {
                "http" => &mut config.http,
                "https" => &mut config.https,
                "all" => &mut config.all,
                _ => return Err(invalid("scheme must be http, https or all")),
            };
            *slot = Some(url.to_string());
        }

        if config.is_empty() {
            return Err(invalid("no proxies given"));
        }
        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none() && self.all.is_none()
    }
}

impl FromStr for ProxyConfig {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// How a client is built. Each client owns its configuration, so two clients
/// with different proxies can be used side by side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub proxy: Option<ProxyConfig>,
    pub user_agent: String,
    /// Limit for a whole request including the body. `None` waits forever.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            connect_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn proxy(mut self, proxy: Option<ProxyConfig>) -> Self {
        self.proxy = proxy;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Option<Duration>) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}
