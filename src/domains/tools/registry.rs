//! Tool Registry - central catalog and dispatch for all tools.
//!
//! This module provides:
//! - The fixed catalog of tools used for discovery
//! - The dispatcher routing a call by name to its tool
//!
//! Both transports go through [`ToolRegistry::call_tool`]; they differ only in
//! the [`InvocationContext`] they hand in.

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use tracing::{debug, info, instrument, warn};

use crate::core::config::CredentialsConfig;

use super::context::InvocationContext;
use super::definitions::{
    EstimatePriceTool, EstimateTimeTool, EstimateTimeWithLogisticTool, QueryTraceTool,
};
use super::error::ToolError;
use super::handlers::LogisticsTool;
use super::models::ToolResult;
use super::upstream::{UpstreamClient, UpstreamRequest};

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - catalog plus dispatcher.
///
/// Holds no mutable state; concurrent calls share only the read-only catalog,
/// the startup credentials and the upstream client.
#[derive(Clone)]
pub struct ToolRegistry {
    credentials: CredentialsConfig,
    client: Arc<dyn UpstreamClient>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(credentials: CredentialsConfig, client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            credentials,
            client,
        }
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for discovery on every transport.
    pub fn list_tools() -> Vec<Tool> {
        vec![
            QueryTraceTool::to_tool(),
            EstimateTimeTool::to_tool(),
            EstimateTimeWithLogisticTool::to_tool(),
            EstimatePriceTool::to_tool(),
        ]
    }

    /// Route a call by name and return the raw upstream body.
    #[instrument(skip(self, arguments, context), fields(contextual = context.is_contextual()))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        context: &InvocationContext,
    ) -> Result<String, ToolError> {
        match name {
            QueryTraceTool::NAME => self.invoke::<QueryTraceTool>(arguments, context).await,
            EstimateTimeTool::NAME => self.invoke::<EstimateTimeTool>(arguments, context).await,
            EstimateTimeWithLogisticTool::NAME => {
                self.invoke::<EstimateTimeWithLogisticTool>(arguments, context)
                    .await
            }
            EstimatePriceTool::NAME => self.invoke::<EstimatePriceTool>(arguments, context).await,
            _ => Err(ToolError::unknown_tool(name)),
        }
    }

    /// Dispatch and wrap the outcome as an MCP tool result.
    ///
    /// Failures of any kind become an error result carrying the rendered
    /// failure message.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        context: &InvocationContext,
    ) -> CallToolResult {
        match self.dispatch(name, arguments, context).await {
            Ok(body) => CallToolResult::success(vec![Content::text(body)]),
            Err(err) => {
                warn!(tool = name, kind = err.kind(), "Tool call failed: {}", err);
                let failure = ToolResult::failure(&err);
                CallToolResult::error(vec![Content::text(failure.markdown())])
            }
        }
    }

    async fn invoke<T: LogisticsTool>(
        &self,
        arguments: Option<JsonObject>,
        context: &InvocationContext,
    ) -> Result<String, ToolError> {
        let params = T::parse_arguments(arguments)?;
        let credentials = context.resolve(&self.credentials)?;

        let request = UpstreamRequest::new(T::METHOD, &credentials, T::upstream_params(params));
        info!("Calling upstream {} for tool {}", T::METHOD, T::NAME);

        let response = self.client.get(&request).await?;
        debug!(
            status = response.status,
            bytes = response.body.len(),
            "Upstream {} answered",
            T::METHOD
        );
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::upstream::{UpstreamMethod, UpstreamResponse};
    use async_trait::async_trait;
    use rmcp::model::RawContent;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Records every request and answers with a canned reply.
    struct RecordingClient {
        requests: Mutex<Vec<UpstreamRequest>>,
        reply: Result<String, String>,
    }

    impl RecordingClient {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply: Ok(body.to_string()),
            })
        }

        fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                reply: Err(msg.to_string()),
            })
        }

        fn requests(&self) -> Vec<UpstreamRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamClient for RecordingClient {
        async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(body) => Ok(UpstreamResponse {
                    status: 200,
                    body: body.clone(),
                }),
                Err(msg) => Err(ToolError::http(msg)),
            }
        }
    }

    fn registry(client: Arc<RecordingClient>, env_key: Option<&str>) -> ToolRegistry {
        ToolRegistry::new(
            CredentialsConfig {
                kuaidi100_api_key: env_key.map(str::to_string),
            },
            client,
        )
    }

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn header_ctx() -> InvocationContext {
        InvocationContext::from_headers([("kuaidi100-api-key", "header-key")])
    }

    fn text_of(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("unexpected content: {other:?}"),
        }
    }

    fn pairs(request: &UpstreamRequest) -> Vec<(&str, &str)> {
        request
            .params()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_catalog_names_in_order() {
        let tools = ToolRegistry::list_tools();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(
            names,
            [
                "query_trace",
                "estimate_time",
                "estimate_time_with_logistic",
                "estimate_price"
            ]
        );
        assert!(tools.iter().all(|t| t.description.is_some()));
    }

    #[test]
    fn test_schema_required_fields() {
        let expected: [(&str, &[&str]); 4] = [
            ("query_trace", QueryTraceTool::REQUIRED),
            ("estimate_time", EstimateTimeTool::REQUIRED),
            ("estimate_time_with_logistic", EstimateTimeWithLogisticTool::REQUIRED),
            ("estimate_price", EstimatePriceTool::REQUIRED),
        ];
        let tools = ToolRegistry::list_tools();

        for (tool, (name, required)) in tools.iter().zip(expected) {
            assert_eq!(tool.name, name);
            let mut schema_required: Vec<&str> = tool
                .input_schema
                .get("required")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let mut declared = required.to_vec();
            schema_required.sort_unstable();
            declared.sort_unstable();
            assert_eq!(schema_required, declared, "required fields of {name}");

            let properties = tool.input_schema.get("properties").and_then(Value::as_object);
            assert!(properties.is_some_and(|p| p.values().all(|v| v.get("description").is_some())));
        }
    }

    #[tokio::test]
    async fn test_query_trace_returns_raw_body() {
        let body = r#"{"message":"ok","data":[]}"#;
        let client = RecordingClient::ok(body);
        let registry = registry(client.clone(), None);

        let result = registry
            .dispatch("query_trace", args(json!({"kuaidi_num": "123456789"})), &header_ctx())
            .await
            .unwrap();

        assert_eq!(result, body);
        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method(), UpstreamMethod::QueryTrace);
        assert_eq!(
            pairs(&requests[0]),
            vec![
                ("key", "header-key"),
                ("responseFormat", "markdown"),
                ("kuaidiNum", "123456789"),
                ("phone", ""),
            ]
        );
    }

    #[tokio::test]
    async fn test_every_tool_maps_parameters() {
        let cases = [
            (
                "estimate_time",
                json!({"kuaidi_com": "jd", "from": "深圳", "to": "北京", "exp_type": "标准快递"}),
                UpstreamMethod::EstimateTime,
                vec!["key", "responseFormat", "kuaidicom", "from", "to", "orderTime", "expType"],
            ),
            (
                "estimate_time_with_logistic",
                json!({"kuaidi_com": "jd", "from": "深圳", "to": "北京", "order_time": "2025-05-09 12:09:38", "logistic": "[]"}),
                UpstreamMethod::EstimateTimeWithLogistic,
                vec!["key", "responseFormat", "kuaidicom", "from", "to", "orderTime", "expType", "logistic"],
            ),
            (
                "estimate_price",
                json!({"kuaidi_com": "jd", "rec_addr": "深圳", "send_addr": "北京", "weight": "1.0"}),
                UpstreamMethod::EstimatePrice,
                vec!["key", "responseFormat", "kuaidicom", "recAddr", "sendAddr", "weight"],
            ),
        ];

        for (name, arguments, method, expected) in cases {
            let client = RecordingClient::ok("{}");
            let registry = registry(client.clone(), None);
            registry
                .dispatch(name, args(arguments), &header_ctx())
                .await
                .unwrap();

            let requests = client.requests();
            assert_eq!(requests.len(), 1, "{name}");
            assert_eq!(requests[0].method(), method);
            assert_eq!(requests[0].param_names(), expected, "{name}");
        }
    }

    #[tokio::test]
    async fn test_missing_argument_makes_no_call() {
        let client = RecordingClient::ok("{}");
        let registry = registry(client.clone(), None);

        let err = registry
            .dispatch(
                "estimate_price",
                args(json!({"kuaidi_com": "jd", "rec_addr": "深圳", "send_addr": "北京"})),
                &header_ctx(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::InvalidArguments(ref msg) if msg.contains("weight")));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_makes_no_call() {
        let client = RecordingClient::ok("{}");
        let registry = registry(client.clone(), Some("env-key"));

        let err = registry
            .dispatch("auto_number", None, &InvocationContext::non_contextual())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "auto_number"));
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let client = RecordingClient::ok("{}");
        let registry = registry(client.clone(), None);
        let arguments = json!({
            "kuaidi_com": "jd",
            "from": "深圳",
            "to": "北京",
            "order_time": "2025-05-09 12:09:38",
            "logistic": "[]"
        });

        for ctx in [
            InvocationContext::non_contextual(),
            InvocationContext::from_headers([("responseFormat", "markdown")]),
        ] {
            let err = registry
                .dispatch("estimate_time_with_logistic", args(arguments.clone()), &ctx)
                .await
                .unwrap_err();
            assert!(matches!(err, ToolError::MissingCredential));
        }
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_non_contextual_uses_configured_key_without_format() {
        let client = RecordingClient::ok("raw");
        let registry = registry(client.clone(), Some("env-key"));

        let body = registry
            .dispatch(
                "query_trace",
                args(json!({"kuaidi_num": "9"})),
                &InvocationContext::non_contextual(),
            )
            .await
            .unwrap();

        assert_eq!(body, "raw");
        assert_eq!(
            pairs(&client.requests()[0]),
            vec![("key", "env-key"), ("kuaidiNum", "9"), ("phone", "")]
        );
    }

    #[tokio::test]
    async fn test_call_tool_success_is_raw_text() {
        let client = RecordingClient::ok("- 📦️**快递公司**： 京东");
        let registry = registry(client, None);

        let result = registry
            .call_tool("query_trace", args(json!({"kuaidi_num": "1"})), &header_ctx())
            .await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "- 📦️**快递公司**： 京东");
    }

    #[tokio::test]
    async fn test_call_tool_failures_render_failure_message() {
        let client = RecordingClient::failing("upstream returned status 502 Bad Gateway");
        let registry = registry(client.clone(), None);

        let transport = registry
            .call_tool("query_trace", args(json!({"kuaidi_num": "1"})), &header_ctx())
            .await;
        assert_eq!(transport.is_error, Some(true));
        assert_eq!(
            text_of(&transport),
            "- ⚠️**异常信息**： HTTP request failed: upstream returned status 502 Bad Gateway"
        );

        let unknown = registry.call_tool("nope", None, &header_ctx()).await;
        assert_eq!(text_of(&unknown), "- ⚠️**异常信息**： Unknown tool: nope");

        let missing = registry
            .call_tool("query_trace", None, &InvocationContext::non_contextual())
            .await;
        assert!(text_of(&missing).contains("missing required field(s): kuaidi_num"));

        // one failed call does not affect the next
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let client = RecordingClient::ok("{}");
        let registry = registry(client.clone(), None);

        let calls = (0..8).map(|i| {
            let registry = registry.clone();
            async move {
                let ctx = InvocationContext::from_headers([("kuaidi100_api_key", format!("key-{i}"))]);
                registry
                    .dispatch("query_trace", args(json!({"kuaidi_num": i.to_string()})), &ctx)
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(Result::is_ok));
        let requests = client.requests();
        assert_eq!(requests.len(), 8);
        for request in &requests {
            let num = request.param("kuaidiNum").unwrap();
            assert_eq!(request.param("key"), Some(format!("key-{num}").as_str()));
        }
    }
}
