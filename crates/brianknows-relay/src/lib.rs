//! BrianKnows Relay Library
//!
//! HTTP relay in front of the BrianKnows API:
//! - Upstream client with a fixed bearer-token header set
//! - Router for agents and knowledge bases
//! - Mapping of upstream failures onto client responses

pub mod error;
pub mod routes;
pub mod upstream;

pub use error::ApiError;
pub use routes::{AppState, build_router};
pub use upstream::{Operation, UpstreamClient, UpstreamError};
