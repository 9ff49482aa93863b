//! Transport layer for the MCP server.
//!
//! Two transport adapters feed the same dispatcher:
//! - **STDIO**: Standard input/output (default for MCP) - feature: `stdio`.
//!   Non-contextual; the credential is configured at startup.
//! - **HTTP**: JSON-RPC over POST - feature: `http`. Contextual; credential
//!   and response format travel as request headers.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
