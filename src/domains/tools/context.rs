//! Invocation context and credential/format resolution.
//!
//! A contextual transport (HTTP) carries request headers with every call and
//! the credential and response format are read from them. A non-contextual
//! transport (STDIO) carries nothing, so the credential configured at startup
//! is used and no response format is negotiated.

use std::fmt;

use crate::core::config::CredentialsConfig;

use super::error::ToolError;

/// Accepted header spellings for the upstream credential.
pub const API_KEY_HEADERS: [&str; 3] = ["KUAIDI100_API_KEY", "kuaidi100-api-key", "kuaidi100_api_key"];

/// Accepted header spellings for the response format.
pub const RESPONSE_FORMAT_HEADERS: [&str; 3] = ["responseFormat", "ResponseFormat", "response_format"];

/// Format the upstream API is asked to render its response in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Human-readable markdown summary (default).
    #[default]
    Markdown,
    /// Any other format value, passed upstream verbatim.
    Other(String),
}

impl ResponseFormat {
    /// Build a format from a header value, keeping it exactly as given.
    pub fn from_value(value: &str) -> Self {
        if value == "markdown" {
            Self::Markdown
        } else {
            Self::Other(value.to_string())
        }
    }

    /// Value sent as the `responseFormat` query parameter.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Markdown => "markdown",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call metadata handed to the dispatcher by a transport.
#[derive(Clone, Default)]
pub struct InvocationContext {
    /// Request headers; `None` for non-contextual transports.
    headers: Option<Vec<(String, String)>>,
}

impl InvocationContext {
    /// Context for a transport that carries no request metadata (STDIO).
    pub fn non_contextual() -> Self {
        Self { headers: None }
    }

    /// Context built from request headers (HTTP).
    pub fn from_headers<I, K, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            headers: Some(
                headers
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Whether this context carries request headers.
    pub fn is_contextual(&self) -> bool {
        self.headers.is_some()
    }

    /// First non-empty header value matching any of `names`, case-insensitively.
    ///
    /// Names are tried in order, so the first spelling wins when several are set.
    pub fn header(&self, names: &[&str]) -> Option<&str> {
        let headers = self.headers.as_ref()?;
        names.iter().find_map(|name| {
            headers
                .iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(name) && !value.is_empty())
                .map(|(_, value)| value.as_str())
        })
    }

    /// Resolve the upstream credential and response format for one invocation.
    ///
    /// Contextual: credential from headers only, format from headers with a
    /// `markdown` default. Non-contextual: credential from the startup
    /// configuration, no format negotiation.
    pub fn resolve(&self, credentials: &CredentialsConfig) -> Result<ResolvedCredentials, ToolError> {
        if self.is_contextual() {
            let api_key = self
                .header(&API_KEY_HEADERS)
                .ok_or(ToolError::MissingCredential)?
                .to_string();
            let format = self
                .header(&RESPONSE_FORMAT_HEADERS)
                .map(ResponseFormat::from_value)
                .unwrap_or_default();
            return Ok(ResolvedCredentials {
                api_key,
                format: Some(format),
            });
        }

        let api_key = credentials
            .kuaidi100_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ToolError::MissingCredential)?
            .to_string();

        Ok(ResolvedCredentials {
            api_key,
            format: None,
        })
    }
}

impl fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Option<Vec<&str>> = self
            .headers
            .as_ref()
            .map(|h| h.iter().map(|(k, _)| k.as_str()).collect());
        f.debug_struct("InvocationContext")
            .field("headers", &header_names)
            .finish()
    }
}

/// Credential and format injected into every outbound parameter set.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub api_key: String,
    /// `None` when the transport does not negotiate a format.
    pub format: Option<ResponseFormat>,
}

impl fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCredentials")
            .field("api_key", &"[REDACTED]")
            .field("format", &self.format)
            .finish()
    }
}
