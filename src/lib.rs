//! kuaidi100 MCP Server Library
//!
//! Exposes four kuaidi100 logistics queries as Model Context Protocol tools:
//! parcel trace lookup, delivery time estimation (with and without a known
//! route history) and shipping price estimation.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the rmcp server handler and the
//!   STDIO / HTTP transports
//! - **domains::tools**: tool definitions, argument validation, credential
//!   resolution, the upstream client and result shaping
//!
//! # Example
//!
//! ```rust,no_run
//! use kuaidi100_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
