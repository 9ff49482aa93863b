//! Upstream kuaidi100 API client.
//!
//! Every tool call becomes exactly one GET against
//! `<base_url><method>?<query>`. There is no retry and no caching; a
//! non-2xx status or a connection failure is a [`ToolError::Transport`].

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::core::config::UpstreamConfig;

use super::context::ResolvedCredentials;
use super::error::ToolError;

/// Base URL of the kuaidi100 tool API.
pub const DEFAULT_BASE_URL: &str = "https://api.kuaidi100.com/stdio/";

/// Query parameter carrying the credential.
pub const KEY_PARAM: &str = "key";

/// Query parameter carrying the negotiated response format.
pub const RESPONSE_FORMAT_PARAM: &str = "responseFormat";

/// The four upstream endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamMethod {
    QueryTrace,
    EstimateTime,
    EstimateTimeWithLogistic,
    EstimatePrice,
}

impl UpstreamMethod {
    /// Endpoint suffix appended to the base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::QueryTrace => "queryTrace",
            Self::EstimateTime => "estimateTime",
            Self::EstimateTimeWithLogistic => "estimateTimeWithLogistic",
            Self::EstimatePrice => "estimatePrice",
        }
    }
}

impl fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// A fully assembled outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    method: UpstreamMethod,
    params: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Assemble a request: `key`, then `responseFormat` when negotiated, then
    /// the tool parameters in their declared order.
    pub fn new<I>(method: UpstreamMethod, credentials: &ResolvedCredentials, tool_params: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        let mut params = vec![(KEY_PARAM.to_string(), credentials.api_key.clone())];
        if let Some(format) = &credentials.format {
            params.push((RESPONSE_FORMAT_PARAM.to_string(), format.as_str().to_string()));
        }
        params.extend(tool_params.into_iter().map(|(k, v)| (k.to_string(), v)));

        Self { method, params }
    }

    pub fn method(&self) -> UpstreamMethod {
        self.method
    }

    /// Ordered query parameters.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of a single query parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parameter names in order.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// URL-encoded query string.
    pub fn query_string(&self) -> Result<String, ToolError> {
        serde_urlencoded::to_string(&self.params)
            .map_err(|e| ToolError::http(format!("failed to encode query: {e}")))
    }
}

impl fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| {
                if k == KEY_PARAM {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("UpstreamRequest")
            .field("method", &self.method)
            .field("params", &params)
            .finish()
    }
}

/// Raw upstream reply. Only successful (2xx) replies are ever constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound seam of the dispatcher.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Issue a single GET for `request`.
    async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError>;
}

/// [`UpstreamClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstreamClient {
    /// Build a client from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let mut base_url = config.base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Full URL of an endpoint, without query.
    pub fn endpoint_url(&self, method: UpstreamMethod) -> String {
        format!("{}{}", self.base_url, method.endpoint())
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    #[instrument(skip_all, fields(method = %request.method()))]
    async fn get(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, ToolError> {
        let endpoint = self.endpoint_url(request.method());
        debug!("GET {} with params {:?}", endpoint, request.param_names());

        let url = format!("{}?{}", endpoint, request.query_string()?);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ToolError::http("request timed out")
                } else if e.is_connect() {
                    ToolError::http(format!("connection failed: {e}"))
                } else {
                    ToolError::http(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(ToolError::http)?;

        if !status.is_success() {
            warn!("Upstream {} returned status {}", request.method(), status);
            debug!("Upstream error body: {}", body);
            return Err(ToolError::http(format!("upstream returned status {status}")));
        }

        debug!("Upstream response received: {} bytes", body.len());

        Ok(UpstreamResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::context::ResponseFormat;
    use tokio_test::assert_err;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(format: Option<ResponseFormat>) -> ResolvedCredentials {
        ResolvedCredentials {
            api_key: "test-key".to_string(),
            format,
        }
    }

    fn no_params() -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn client_for(server: &MockServer) -> HttpUpstreamClient {
        HttpUpstreamClient::new(&UpstreamConfig {
            base_url: format!("{}/stdio", server.uri()),
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_request_parameter_order() {
        let request = UpstreamRequest::new(
            UpstreamMethod::QueryTrace,
            &credentials(Some(ResponseFormat::Markdown)),
            [("kuaidiNum", "123".to_string()), ("phone", String::new())],
        );
        assert_eq!(
            request.param_names(),
            vec!["key", "responseFormat", "kuaidiNum", "phone"]
        );
        assert_eq!(request.param("responseFormat"), Some("markdown"));
    }

    #[test]
    fn test_request_without_format() {
        let request = UpstreamRequest::new(
            UpstreamMethod::EstimatePrice,
            &credentials(None),
            [("weight", "1".to_string())],
        );
        assert_eq!(request.param_names(), vec!["key", "weight"]);
    }

    #[test]
    fn test_query_string_is_url_encoded() {
        let request = UpstreamRequest::new(
            UpstreamMethod::EstimateTime,
            &credentials(None),
            [("from", "广东省深圳市".to_string()), ("orderTime", "2023-08-08 08:08:08".to_string())],
        );
        let query = request.query_string().unwrap();
        assert!(query.starts_with("key=test-key&from=%E5%B9%BF"));
        assert!(query.ends_with("orderTime=2023-08-08+08%3A08%3A08"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let request = UpstreamRequest::new(UpstreamMethod::QueryTrace, &credentials(None), no_params());
        let debug_str = format!("{:?}", request);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("test-key"));
    }

    #[test]
    fn test_endpoint_url_normalises_trailing_slash() {
        let client = HttpUpstreamClient::new(&UpstreamConfig {
            base_url: "https://api.kuaidi100.com/stdio".to_string(),
            timeout_secs: None,
        })
        .unwrap();
        assert_eq!(
            client.endpoint_url(UpstreamMethod::EstimateTimeWithLogistic),
            "https://api.kuaidi100.com/stdio/estimateTimeWithLogistic"
        );
    }

    #[tokio::test]
    async fn test_get_returns_raw_body() {
        let server = MockServer::start().await;
        let body = r#"{"kuaidiNum":"123456789","state":"在途"}"#;
        Mock::given(method("GET"))
            .and(path("/stdio/queryTrace"))
            .and(query_param("key", "test-key"))
            .and(query_param("kuaidiNum", "123456789"))
            .and(query_param("phone", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpstreamRequest::new(
            UpstreamMethod::QueryTrace,
            &credentials(None),
            [("kuaidiNum", "123456789".to_string()), ("phone", String::new())],
        );
        let response = client_for(&server).get(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, body);
    }

    #[tokio::test]
    async fn test_get_sends_encoded_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stdio/estimateTime"))
            .and(query_param("key", "test-key"))
            .and(query_param("responseFormat", "markdown"))
            .and(query_param("from", "广东省深圳市"))
            .and(query_param("orderTime", "2023-08-08 08:08:08"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let request = UpstreamRequest::new(
            UpstreamMethod::EstimateTime,
            &credentials(Some(ResponseFormat::Markdown)),
            [("from", "广东省深圳市".to_string()), ("orderTime", "2023-08-08 08:08:08".to_string())],
        );
        let response = client_for(&server).get(&request).await.unwrap();
        assert_eq!(response.body, "ok");
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stdio/estimatePrice"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"price":"12"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let request = UpstreamRequest::new(UpstreamMethod::EstimatePrice, &credentials(None), no_params());
        let result = client_for(&server).get(&request).await;
        let err = assert_err!(result);
        assert!(matches!(err, ToolError::Transport(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client = HttpUpstreamClient::new(&UpstreamConfig {
            base_url: "http://127.0.0.1:1/stdio/".to_string(),
            timeout_secs: Some(2),
        })
        .unwrap();
        let request = UpstreamRequest::new(UpstreamMethod::QueryTrace, &credentials(None), no_params());
        let result = client.get(&request).await;
        assert!(matches!(result, Err(ToolError::Transport(_))));
    }
}
