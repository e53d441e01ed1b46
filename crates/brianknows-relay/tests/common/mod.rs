//! In-process stand-in for the BrianKnows API.
//!
//! Answers every request with a fixed status and body and records what it
//! received, so tests can check both the forwarded request and whether any
//! outbound call happened at all.

#![allow(clippy::unwrap_used, dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, Uri};

use brianknows_core::UpstreamConfig;
use brianknows_relay::{AppState, UpstreamClient, build_router};

pub const TEST_TOKEN: &str = "bk-test-token";

/// One request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedCall {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct StubUpstream {
    pub base_url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubUpstream {
    pub async fn start(status: u16, body: &'static str) -> Self {
        Self::start_with_delay(status, body, Duration::ZERO).await
    }

    /// Like [`Self::start`] but waits `delay` before answering.
    pub async fn start_with_delay(status: u16, body: &'static str, delay: Duration) -> Self {
        let calls: Arc<Mutex<Vec<RecordedCall>>> = Arc::default();
        let status = StatusCode::from_u16(status).unwrap();

        let recorder = Arc::clone(&calls);
        let app = axum::Router::new().fallback(
            move |method: Method, uri: Uri, headers: HeaderMap, body_in: Bytes| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push(RecordedCall {
                        method,
                        path: uri.path().to_string(),
                        headers,
                        body: body_in,
                    });
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    (status, body)
                }
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Relay router pointed at this stub.
    pub fn relay(&self) -> axum::Router {
        self.relay_with_timeout(Some(Duration::from_secs(5)))
    }

    pub fn relay_with_timeout(&self, timeout: Option<Duration>) -> axum::Router {
        relay_for(&self.base_url, timeout)
    }
}

/// Relay router pointed at an arbitrary base URL.
pub fn relay_for(base_url: &str, timeout: Option<Duration>) -> axum::Router {
    let config = UpstreamConfig::new(base_url, TEST_TOKEN).with_timeout(timeout);
    let client = UpstreamClient::new(&config).unwrap();
    build_router(AppState::new(client))
}
