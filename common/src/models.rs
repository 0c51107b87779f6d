// Data models for endpoint templates, concrete endpoints and probe results

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Endpoint Models
// ============================================================================

/// EndpointTemplate describes one or more probe targets
///
/// When `iterations` is empty the template is itself a concrete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTemplate {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iterations: Vec<Iteration>,
}

/// Iteration holds the substitution values for one generated endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Iteration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

/// Endpoint is a concrete probe target produced by expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub name: String,
    pub url: String,
    pub method: String,
}

impl Endpoint {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: method.into(),
        }
    }
}

impl From<EndpointTemplate> for Endpoint {
    fn from(template: EndpointTemplate) -> Self {
        Self {
            name: template.name,
            url: template.url,
            method: template.method,
        }
    }
}

// ============================================================================
// Probe Models
// ============================================================================

/// ProbeHeaders carries the per-request header settings shared by every probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeHeaders {
    pub api_key_header_name: String,
    pub api_key: String,
    pub user_agent: String,
}

/// ProbeReport is the structured outcome of a probe that received a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub endpoint: String,
    pub method: String,
    pub status: u16,
    pub duration: Duration,
}

impl ProbeReport {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
