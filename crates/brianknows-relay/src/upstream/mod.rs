//! Upstream BrianKnows API integration.
//!
//! Provides a reqwest-based client covering the agent and knowledge base
//! endpoints, plus the table of operations the relay forwards.

mod client;
pub mod operation;


pub use client::{UpstreamClient, UpstreamError};
pub use operation::Operation;
