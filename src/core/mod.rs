//! Core module containing shared infrastructure components.
//!
//! Configuration, error handling, the rmcp server handler and the transport
//! adapters that feed tool calls into the dispatcher.

pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
