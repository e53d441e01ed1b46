//! BrianKnows Relay Core Library
//!
//! Shared functionality for the relay:
//! - Upstream configuration
//! - Agent and knowledge base payload validation
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod error;
pub mod models;
pub mod tracing_init;

pub use config::UpstreamConfig;
pub use error::{Error, Result};
pub use models::{Agent, KnowledgeBase, Payload, ValidationErrors};
