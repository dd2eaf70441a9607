use std::fmt;
use std::io::Read;

use crate::error::Result;

/// Status line, selected headers and body of a response.
pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    /// Declared body length, `None` for chunked or unannounced bodies.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("body", &"{ ... }")
            .finish()
    }
}

/// Blocking HTTP client abstraction.
///
/// Implementations follow redirects and apply their own proxy and timeout
/// configuration. Transport failures are reported as
/// [`FetchError::Unreachable`](crate::FetchError::Unreachable); a response with
/// any status is returned as-is so the caller decides what counts as success.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest::blocking`
/// - Mock implementations for testing
pub trait HttpClient {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Response>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Response> {
        (**self).get(url, headers)
    }
}

/// Standard reason phrase for a status code.
pub fn canonical_reason(status: u16) -> String {
    #[cfg(feature = "reqwest")]
    {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status")
            .to_string()
    }

    #[cfg(not(feature = "reqwest"))]
    {
        let _ = status;
        "Unknown Status".to_string()
    }
}

/// Render an error with its whole source chain, which is where reqwest keeps
/// the interesting part ("connection refused", "dns error", ...).
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::FetchError;

    /// Production HTTP client implementation using reqwest.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::blocking::Client,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self> {
            Self::with_config(&ClientConfig::default())
        }

        pub fn with_config(config: &ClientConfig) -> Result<Self> {
            let mut builder = reqwest::blocking::Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.timeout);
            if let Some(connect_timeout) = config.connect_timeout {
                builder = builder.connect_timeout(connect_timeout);
            }

            if let Some(proxy) = &config.proxy {
                // an explicit proxy replaces the ones taken from the environment
                let proxy_error = |url: &str, e: reqwest::Error| FetchError::InvalidProxy {
                    spec: url.to_string(),
                    reason: e.to_string(),
                };
                if let Some(url) = &proxy.http {
                    builder = builder.proxy(reqwest::Proxy::http(url).map_err(|e| proxy_error(url, e))?);
                }
                if let Some(url) = &proxy.https {
                    builder =
                        builder.proxy(reqwest::Proxy::https(url).map_err(|e| proxy_error(url, e))?);
                }
                if let Some(url) = &proxy.all {
                    builder = builder.proxy(reqwest::Proxy::all(url).map_err(|e| proxy_error(url, e))?);
                }
            }

            let client = builder
                .build()
                .map_err(|e| FetchError::Client(error_chain(&e)))?;
            tracing::debug!(
                proxied = config.proxy.is_some(),
                user_agent = %config.user_agent,
                "http client ready"
            );
            Ok(Self { client })
        }
    }

    fn map_reqwest_error(url: &str, err: reqwest::Error) -> FetchError {
        if err.is_builder() {
            return FetchError::InvalidUrl(format!("{url}: {}", error_chain(&err)));
        }
        let reason = if err.is_timeout() {
            format!("timed out: {}", error_chain(&err))
        } else {
            error_chain(&err)
        };
        FetchError::Unreachable {
            url: url.to_string(),
            reason,
        }
    }

    impl HttpClient for ReqwestClient {
        fn get(&self, url: &str, headers: &[(String, String)]) -> Result<Response> {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let response = request.send().map_err(|e| map_reqwest_error(url, e))?;
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            Ok(Response {
                status: response.status().as_u16(),
                content_type,
                content_length: response.content_length(),
                body: Box::new(response),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
