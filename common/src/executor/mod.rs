// Executor module for endpoint probing
// Provides the prober trait, the HTTP probe executor and its transports

pub mod http;
pub mod transport;

pub use http::ProbeExecutor;
pub use transport::{HttpTransport, LoggingTransport, ReqwestTransport};

use crate::errors::ProbeError;
use crate::models::{Endpoint, ProbeReport};
use async_trait::async_trait;

/// EndpointProber defines the interface for probing a single endpoint
#[async_trait]
pub trait EndpointProber: Send + Sync {
    /// Probe the endpoint once and report the outcome
    async fn probe(&self, endpoint: &Endpoint) -> Result<ProbeReport, ProbeError>;
}
