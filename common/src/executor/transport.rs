// HTTP transports used by the probe executor
//
// `ReqwestTransport` owns the pooled client; `LoggingTransport` decorates any
// transport with request/response dumps at DEBUG level.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Request, Response};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::debug;

/// User-Agent sent when the configuration does not provide one
pub const DEFAULT_USER_AGENT: &str = concat!("pinger/", env!("CARGO_PKG_VERSION"));

/// HttpTransport performs a single request/response round trip
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error>;
}

/// Transport backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport; `None` disables the request deadline
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Create a transport from the configured timeout in seconds, where 0 means no deadline
    pub fn from_timeout_seconds(timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        let timeout = (timeout_seconds > 0).then(|| Duration::from_secs(timeout_seconds));
        Self::new(timeout)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error> {
        self.client.execute(request).await
    }
}

/// LoggingTransport dumps requests and responses without altering them
#[derive(Debug, Clone)]
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: HttpTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for LoggingTransport<T> {
    async fn round_trip(&self, request: Request) -> Result<Response, reqwest::Error> {
        debug!("[HTTP Request]\n{}", dump_request(&request));

        let method = request.method().clone();
        let url = request.url().clone();

        match self.inner.round_trip(request).await {
            Ok(response) => {
                debug!("[HTTP Response]\n{}", dump_response(&response));
                Ok(response)
            }
            Err(e) => {
                debug!(method = %method, url = %url, error = %e, "[HTTP Error]");
                Err(e)
            }
        }
    }
}

/// Render the request line and headers; bodies are never dumped
///
/// Only headers set on the request itself appear. Client defaults and
/// connection headers added later (`accept`, `host`) are not shown.
pub fn dump_request(request: &Request) -> String {
    let mut dump = format!(
        "{} {} {:?}\n",
        request.method(),
        request.url(),
        request.version()
    );
    write_headers(&mut dump, request.headers());
    dump
}

/// Render the status line and headers; bodies are never dumped
pub fn dump_response(response: &Response) -> String {
    let mut dump = format!("{:?} {}\n", response.version(), response.status());
    write_headers(&mut dump, response.headers());
    dump
}

fn write_headers(dump: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = if value.is_sensitive() {
            "<redacted>"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        let _ = writeln!(dump, "{}: {}", name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, USER_AGENT};
    use reqwest::{Method, Url};

    fn request_with_headers() -> Request {
        let url = Url::parse("https://example.com/health?verbose=1").unwrap();
        let mut request = Request::new(Method::GET, url);
        request
            .headers_mut()
            .insert(USER_AGENT, HeaderValue::from_static("Pinger"));
        let mut secret = HeaderValue::from_static("secret-123");
        secret.set_sensitive(true);
        request.headers_mut().insert("x-api-key", secret);
        request
    }

    #[test]
    fn test_dump_request_includes_request_line_and_headers() {
        let dump = dump_request(&request_with_headers());

        assert!(dump.starts_with("GET https://example.com/health?verbose=1 HTTP/1.1\n"));
        assert!(dump.contains("user-agent: Pinger\n"));
    }

    #[test]
    fn test_dump_request_redacts_sensitive_headers() {
        let dump = dump_request(&request_with_headers());

        assert!(dump.contains("x-api-key: <redacted>\n"));
        assert!(!dump.contains("secret-123"));
    }

    #[test]
    fn test_transport_from_zero_timeout() {
        assert!(ReqwestTransport::from_timeout_seconds(0).is_ok());
        assert!(ReqwestTransport::from_timeout_seconds(30).is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        assert!(DEFAULT_USER_AGENT.starts_with("pinger/"));
    }
}
