//! Tools domain module.
//!
//! This module handles everything between an incoming tool call and the
//! kuaidi100 API: credential/format resolution, argument validation, the
//! upstream request, and optional shaping of the reply into typed results.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `handlers.rs` - The `LogisticsTool` contract and argument validation
//! - `context.rs` - Invocation context and credential/format resolution
//! - `upstream.rs` - Outbound request model and HTTP client
//! - `models.rs` - Typed result variants and their markdown renderers
//! - `registry.rs` - Tool catalog and dispatcher
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` with a params struct and a type
//!    implementing `LogisticsTool`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add it to `ToolRegistry::list_tools` and `ToolRegistry::dispatch`

pub mod context;
pub mod definitions;
mod error;
pub mod handlers;
pub mod models;
mod registry;
pub mod upstream;

pub use context::{InvocationContext, ResolvedCredentials, ResponseFormat};
pub use error::ToolError;
pub use handlers::LogisticsTool;
pub use models::{
    FailureResult, PriceCombo, PriceEstimateResult, TimeEstimateResult, ToolResult, TraceEvent,
    TraceResult,
};
pub use registry::ToolRegistry;
pub use upstream::{
    HttpUpstreamClient, UpstreamClient, UpstreamMethod, UpstreamRequest, UpstreamResponse,
};
