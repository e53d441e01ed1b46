//! BrianKnows REST API client.
//!
//! Forwards agent and knowledge base calls with a fixed header set and hands
//! back the upstream body untouched.

use std::net::IpAddr;

use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::IgnoredAny;
use thiserror::Error;
use tracing::{debug, warn};

use brianknows_core::{Agent, KnowledgeBase, UpstreamConfig};

use super::operation::Operation;

/// Upstream call errors.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a status other than 200.
    #[error("upstream returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Connection refused, DNS failure or any other transport problem.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream timed out")]
    Timeout,

    /// A 200 response whose body is not JSON.
    #[error("upstream returned malformed body: {0}")]
    MalformedBody(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() || e.is_body() {
            Self::MalformedBody(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}

/// BrianKnows REST API client.
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    /// Create a new client. The bearer token is baked into the default headers.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        config
            .validate()
            .map_err(|e| UpstreamError::Config(e.to_string()))?;
        let parsed = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Config(format!("invalid base URL: {e}")))?;

        let mut headers = HeaderMap::new();
        let mut token_val = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| UpstreamError::Config("Invalid token format".into()))?;
        token_val.set_sensitive(true);
        headers.insert(AUTHORIZATION, token_val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // reqwest is built with rustls-no-provider; Err only means a provider is already set.
        let _ = rustls::crypto::ring::default_provider().install_default();

        // No idle pool: every call opens its own connection and drops it afterwards.
        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .pool_max_idle_per_host(0);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if is_loopback(&parsed) {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(|e| UpstreamError::Config(e.to_string()))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Absolute upstream URL for an operation.
    pub(crate) fn url(&self, op: Operation) -> String {
        self.config.url(op.path())
    }

    pub async fn list_agents(&self) -> Result<Bytes, UpstreamError> {
        self.forward::<()>(Operation::ListAgents, None).await
    }

    pub async fn create_agent(&self, agent: &Agent) -> Result<Bytes, UpstreamError> {
        self.forward(Operation::CreateAgent, Some(agent)).await
    }

    pub async fn list_knowledge_bases(&self) -> Result<Bytes, UpstreamError> {
        self.forward::<()>(Operation::ListKnowledgeBases, None).await
    }

    pub async fn create_knowledge_base(
        &self,
        knowledge_base: &KnowledgeBase,
    ) -> Result<Bytes, UpstreamError> {
        self.forward(Operation::CreateKnowledgeBase, Some(knowledge_base))
            .await
    }

    /// Issue one upstream call and return the raw response body.
    ///
    /// Only status 200 counts as success. Anything else becomes
    /// [`UpstreamError::Rejected`] carrying the upstream status and body text.
    pub async fn forward<T: Serialize + ?Sized>(
        &self,
        op: Operation,
        body: Option<&T>,
    ) -> Result<Bytes, UpstreamError> {
        let url = self.url(op);
        let mut request = self.http.request(op.method(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            warn!(operation = %op, error = %e, "Upstream request failed");
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            // A body that stalls or breaks off is a transport failure, not a rejection.
            let body = response.text().await.map_err(|e| {
                warn!(
                    operation = %op,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read upstream error body"
                );
                UpstreamError::from(e)
            })?;
            warn!(operation = %op, status = status.as_u16(), "Upstream rejected request");
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;
        debug!(operation = %op, bytes = bytes.len(), "Upstream call succeeded");
        Ok(bytes)
    }
}

pub(crate) fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}
