//! Tool-specific error types.
//!
//! Every variant is scoped to a single invocation: a failed call is reported
//! back to the caller and never affects subsequent calls.

use thiserror::Error;

/// Errors that can occur while dispatching a tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No upstream credential could be resolved from any source.
    #[error("KUAIDI100_API_KEY not set")]
    MissingCredential,

    /// Invalid or missing arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The requested tool is not part of the registry.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The upstream request failed or its response could not be interpreted.
    #[error("{0}")]
    Transport(String),
}

impl ToolError {
    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create an "invalid arguments" error naming every missing field.
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::InvalidArguments(format!(
            "missing required field(s): {}",
            fields.join(", ")
        ))
    }

    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a transport error for a failed HTTP exchange.
    pub fn http(msg: impl std::fmt::Display) -> Self {
        Self::Transport(format!("HTTP request failed: {msg}"))
    }

    /// Create a transport error for an upstream body of unexpected shape.
    pub fn parse(msg: impl std::fmt::Display) -> Self {
        Self::Transport(format!("Failed to parse response: {msg}"))
    }

    /// Short machine-friendly name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::UnknownTool(_) => "unknown_tool",
            Self::Transport(_) => "transport",
        }
    }
}
