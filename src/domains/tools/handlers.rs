//! Tool handler contract and argument validation.
//!
//! Each tool is a zero-sized type implementing [`LogisticsTool`]: it declares
//! its name, description, upstream endpoint, typed parameters and the mapping
//! from its own argument names to the upstream query parameter names.

use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{JsonObject, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ToolError;
use super::upstream::UpstreamMethod;

/// A tool relayed to one kuaidi100 endpoint.
pub trait LogisticsTool {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Upstream endpoint this tool calls.
    const METHOD: UpstreamMethod;

    /// Argument names that must be present.
    const REQUIRED: &'static [&'static str];

    /// Typed, validated arguments.
    type Params: DeserializeOwned + JsonSchema + 'static;

    /// Upstream query parameters (excluding `key`/`responseFormat`) in order.
    fn upstream_params(params: Self::Params) -> Vec<(&'static str, String)>;

    /// Create a Tool model for this tool (metadata).
    fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<Self::Params>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Validate raw call arguments into [`Self::Params`].
    fn parse_arguments(arguments: Option<JsonObject>) -> Result<Self::Params, ToolError> {
        parse_arguments(Self::REQUIRED, arguments)
    }
}

/// Normalise, check required fields, then deserialize.
///
/// `null` counts as absent. Numbers and booleans are stringified; arrays and
/// objects are passed on as compact JSON text. Every missing required field is
/// reported at once; unknown fields are rejected by the params type.
pub fn parse_arguments<P: DeserializeOwned>(
    required: &[&str],
    arguments: Option<JsonObject>,
) -> Result<P, ToolError> {
    let mut normalized = JsonObject::new();
    for (key, value) in arguments.unwrap_or_default() {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
        };
        normalized.insert(key, Value::String(text));
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| !normalized.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::missing_fields(&missing));
    }

    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}
