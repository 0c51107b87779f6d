// HTTP probe executor
// One request per invocation: no retries, no state kept between invocations

use crate::errors::ProbeError;
use crate::executor::transport::{HttpTransport, DEFAULT_USER_AGENT};
use crate::executor::EndpointProber;
use crate::models::{Endpoint, ProbeHeaders, ProbeReport};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Method, Request, Response, Url};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Upper bound for discarding a response body after the status is known
const BODY_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// ProbeExecutor pings endpoints through a shared transport
#[derive(Clone)]
pub struct ProbeExecutor {
    transport: Arc<dyn HttpTransport>,
    headers: ProbeHeaders,
}

impl ProbeExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>, headers: ProbeHeaders) -> Self {
        Self { transport, headers }
    }

    /// Build the outgoing request for an endpoint
    ///
    /// An empty method defaults to GET. The API key header is only set when a
    /// key is configured. The User-Agent is always set on the request, falling
    /// back to `DEFAULT_USER_AGENT`, so request dumps show what is sent.
    pub fn build_request(&self, endpoint: &Endpoint) -> Result<Request, ProbeError> {
        let method = if endpoint.method.is_empty() {
            Method::GET
        } else {
            Method::from_bytes(endpoint.method.as_bytes()).map_err(|e| {
                ProbeError::InvalidRequest(format!("invalid method '{}': {}", endpoint.method, e))
            })?
        };

        let url = Url::parse(&endpoint.url).map_err(|e| {
            ProbeError::InvalidRequest(format!("invalid url '{}': {}", endpoint.url, e))
        })?;

        let mut request = Request::new(method, url);

        if !self.headers.api_key.is_empty() {
            let name = HeaderName::from_bytes(self.headers.api_key_header_name.as_bytes())
                .map_err(|e| {
                    ProbeError::InvalidRequest(format!(
                        "invalid api key header name '{}': {}",
                        self.headers.api_key_header_name, e
                    ))
                })?;
            let mut value = HeaderValue::from_str(&self.headers.api_key).map_err(|e| {
                ProbeError::InvalidRequest(format!("invalid api key value: {}", e))
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(name, value);
        }

        let user_agent = if self.headers.user_agent.is_empty() {
            DEFAULT_USER_AGENT
        } else {
            self.headers.user_agent.as_str()
        };
        let value = HeaderValue::from_str(user_agent)
            .map_err(|e| ProbeError::InvalidRequest(format!("invalid user agent: {}", e)))?;
        request.headers_mut().insert(USER_AGENT, value);

        Ok(request)
    }

    /// Ping one endpoint and log the outcome
    ///
    /// Exactly one outcome record is logged per call: INFO with status and
    /// duration on a response (any status code), ERROR otherwise.
    #[tracing::instrument(skip_all, fields(endpoint = %endpoint.name))]
    pub async fn execute(&self, endpoint: &Endpoint) -> Result<ProbeReport, ProbeError> {
        let started = Instant::now();

        let request = match self.build_request(endpoint) {
            Ok(request) => request,
            Err(e) => {
                error!(endpoint = %endpoint.name, reason = e.reason(), error = %e, "Ping failed");
                return Err(e);
            }
        };
        let method = request.method().clone();

        let response = match self.transport.round_trip(request).await {
            Ok(response) => response,
            Err(e) => {
                let e = ProbeError::from_transport(e);
                error!(endpoint = %endpoint.name, reason = e.reason(), error = %e, "Ping failed");
                return Err(e);
            }
        };

        let status = response.status();
        let duration = started.elapsed();

        info!(
            endpoint = %endpoint.name,
            method = %method,
            status = %status,
            duration_ms = duration.as_millis() as u64,
            "Ping completed"
        );

        release_body(&endpoint.name, response).await;

        Ok(ProbeReport {
            endpoint: endpoint.name.clone(),
            method: method.to_string(),
            status: status.as_u16(),
            duration,
        })
    }
}

#[async_trait]
impl EndpointProber for ProbeExecutor {
    async fn probe(&self, endpoint: &Endpoint) -> Result<ProbeReport, ProbeError> {
        self.execute(endpoint).await
    }
}

/// Discard the remaining body so the connection returns to the pool
///
/// Failures are logged and swallowed; the response is dropped either way.
async fn release_body(endpoint: &str, response: Response) {
    match tokio::time::timeout(BODY_DRAIN_TIMEOUT, drain_body(response)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(endpoint, error = %e, "Failed to release response body");
        }
        Err(_) => {
            warn!(
                endpoint,
                timeout = ?BODY_DRAIN_TIMEOUT,
                "Timed out releasing response body"
            );
        }
    }
}

async fn drain_body(mut response: Response) -> Result<(), reqwest::Error> {
    while response.chunk().await?.is_some() {}
    Ok(())
}
