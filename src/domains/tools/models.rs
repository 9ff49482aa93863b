//! Typed result models for upstream responses.
//!
//! Dispatch returns the upstream body untouched; shaping a body into a
//! [`ToolResult`] is an opt-in step for callers that need structured access
//! to the fields (for example, computing the remaining transit time).

use chrono::{Local, NaiveDateTime, TimeDelta};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ToolError;
use super::upstream::UpstreamMethod;

/// Timestamp layout used by the upstream API.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Result variants
// ============================================================================

/// Real-time trace of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    /// Carrier code, e.g. `yuantong`.
    pub kuaidi_com: String,
    /// Carrier display name, e.g. `圆通速递`.
    pub kuaidi_name: String,
    pub kuaidi_num: String,
    /// Current state, e.g. `揽收`, `在途`, `已签收`.
    pub state: String,
    /// `origin -> destination`.
    pub from_to: String,
    /// Trace events, most recent first as delivered upstream.
    pub data: Vec<TraceEvent>,
}

/// A single node of a shipment trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub time: String,
    pub status: String,
    pub context: String,
}

/// Delivery-time estimate, with or without trace history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEstimateResult {
    pub from_name: String,
    pub to_name: String,
    pub order_time: String,
    pub arrival_time: String,
    /// Remaining time in minutes.
    #[serde(deserialize_with = "integer_like")]
    pub remain_time: i64,
    pub delivery_expend_time: String,
    #[serde(default)]
    pub exp_type: Option<String>,
    /// Upstream clock at the time of the estimate, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<String>,
}

/// Shipping price estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimateResult {
    pub kuaidicom: String,
    pub kuaidi_name: String,
    pub from: String,
    pub to: String,
    /// Weight in kilograms.
    #[serde(deserialize_with = "string_like")]
    pub weight: String,
    pub combos: Vec<PriceCombo>,
}

/// One price option of a [`PriceEstimateResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceCombo {
    /// Price in yuan.
    #[serde(deserialize_with = "string_like")]
    pub price: String,
    pub exp_type: String,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// Failure payload shared by every tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResult {
    pub message: String,
}

impl FailureResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&ToolError> for FailureResult {
    fn from(err: &ToolError) -> Self {
        Self::new(err.to_string())
    }
}

/// Outcome of one invocation; exactly one variant is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    Trace(TraceResult),
    TimeEstimate(TimeEstimateResult),
    PriceEstimate(PriceEstimateResult),
    Failure(FailureResult),
}

// ============================================================================
// Shaping
// ============================================================================

impl ToolResult {
    /// Strictly parse an upstream body into the variant for `method`.
    ///
    /// The payload may sit at the root or under a `data` object. Any shape
    /// mismatch is a [`ToolError::Transport`].
    pub fn parse(method: UpstreamMethod, body: &str) -> Result<Self, ToolError> {
        match method {
            UpstreamMethod::QueryTrace => parse_payload(body).map(Self::Trace),
            UpstreamMethod::EstimateTime | UpstreamMethod::EstimateTimeWithLogistic => {
                parse_payload(body).map(Self::TimeEstimate)
            }
            UpstreamMethod::EstimatePrice => parse_payload(body).map(Self::PriceEstimate),
        }
    }

    /// Shape an upstream body, falling back to [`ToolResult::Failure`].
    ///
    /// Error payloads (`message`/`msg` without the expected fields, with a
    /// failure flag or status or a message that is not a success marker) keep
    /// the upstream message; anything else uninterpretable carries the parse
    /// error.
    pub fn shape(method: UpstreamMethod, body: &str) -> Self {
        match Self::parse(method, body) {
            Ok(result) => result,
            Err(err) => Self::Failure(
                upstream_error_message(body)
                    .map(FailureResult::new)
                    .unwrap_or_else(|| FailureResult::from(&err)),
            ),
        }
    }

    /// Failure built from a dispatch error.
    pub fn failure(err: &ToolError) -> Self {
        Self::Failure(err.into())
    }

    /// Render the populated variant as markdown.
    pub fn markdown(&self) -> String {
        match self {
            Self::Trace(r) => r.markdown(),
            Self::TimeEstimate(r) => r.markdown(),
            Self::PriceEstimate(r) => r.markdown(),
            Self::Failure(r) => r.markdown(),
        }
    }
}

fn parse_payload<T: DeserializeOwned>(body: &str) -> Result<T, ToolError> {
    let value: Value = serde_json::from_str(body).map_err(ToolError::parse)?;

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Ok(parsed),
        Err(root_err) => match value.get("data") {
            Some(data @ Value::Object(_)) => {
                serde_json::from_value(data.clone()).map_err(ToolError::parse)
            }
            _ => Err(ToolError::parse(root_err)),
        },
    }
}

/// Upstream message of a payload that reports failure.
///
/// A message alone is not enough: `"message": "ok"` next to a 200 status is a
/// success marker and must not hide the real parse error.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = ["message", "msg"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.is_empty())?;

    if reports_failure(&value) || !is_success_marker(message) {
        Some(message.to_string())
    } else {
        None
    }
}

fn reports_failure(value: &Value) -> bool {
    let flag_false = ["success", "result"]
        .iter()
        .any(|key| value.get(*key) == Some(&Value::Bool(false)));

    let bad_status = ["status", "returnCode"]
        .iter()
        .filter_map(|key| value.get(*key))
        .any(|status| match status {
            Value::String(s) => s.trim() != "200",
            Value::Number(n) => n.as_u64() != Some(200),
            _ => false,
        });

    flag_false || bad_status
}

fn is_success_marker(message: &str) -> bool {
    let message = message.trim();
    ["ok", "success", "成功"]
        .iter()
        .any(|marker| message.eq_ignore_ascii_case(marker))
}

fn string_like<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

fn integer_like<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| de::Error::custom(format!("expected integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected integer, got {s:?}"))),
        other => Err(de::Error::custom(format!("expected integer, got {other}"))),
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl TraceResult {
    pub fn markdown(&self) -> String {
        let rows: Vec<Vec<&str>> = self
            .data
            .iter()
            .map(|e| vec![e.time.as_str(), e.status.as_str(), e.context.as_str()])
            .collect();

        format!(
            "- 📦️**快递公司**： {}\n\
             - ℹ️**快递单号**： {}\n\
             - 📧️**物流状态**： {}\n\
             - 🚚**起点->目的地**： {}\n\
             **物流轨迹**{}",
            self.kuaidi_name,
            self.kuaidi_num,
            self.state,
            self.from_to,
            markdown_table(&["时间", "状态", "详情"], &rows)
        )
    }
}

impl TimeEstimateResult {
    pub fn markdown(&self) -> String {
        let mut out = format!(
            "- 📦️️**出发地**： {}\n\
             - 📍️**目的地**： {}\n\
             - 📱**下单时间**： {}\n\
             - 🚚**预计到达时间**： {}\n\
             - 📨**预计耗时**： {}\n\
             - 🕐**剩余时间**： {}分钟\n",
            self.from_name,
            self.to_name,
            self.order_time,
            self.arrival_time,
            self.delivery_expend_time,
            self.remain_time
        );
        if let Some(exp_type) = self.exp_type.as_deref().filter(|t| !t.is_empty()) {
            out.push_str(&format!("- 🏷️**业务类型**： {exp_type}\n"));
        }
        out
    }

    /// Time left until `arrival_time`, measured from the upstream `now` when
    /// it parses, otherwise from the local clock.
    pub fn remaining_transit(&self) -> Option<TimeDelta> {
        let now = self
            .now
            .as_deref()
            .and_then(|now| NaiveDateTime::parse_from_str(now, TIME_FORMAT).ok())
            .unwrap_or_else(|| Local::now().naive_local());
        self.remaining_transit_at(now)
    }

    /// Time left until `arrival_time` as seen from `now`.
    pub fn remaining_transit_at(&self, now: NaiveDateTime) -> Option<TimeDelta> {
        let arrival = NaiveDateTime::parse_from_str(&self.arrival_time, TIME_FORMAT).ok()?;
        Some(arrival - now)
    }
}

impl PriceEstimateResult {
    pub fn markdown(&self) -> String {
        let with_product = self.combos.iter().any(|c| c.product_name.is_some());

        let rows: Vec<Vec<&str>> = self
            .combos
            .iter()
            .map(|c| {
                let mut row = vec![c.exp_type.as_str(), c.price.as_str()];
                if with_product {
                    row.push(c.product_name.as_deref().unwrap_or(""));
                }
                row
            })
            .collect();

        let headers: &[&str] = if with_product {
            &["业务/产品类型", "价格（元）", "产品名称"]
        } else {
            &["业务/产品类型", "价格（元）"]
        };

        format!(
            "- 🚚**快递公司**： {}\n\
             - 📦️️**出发地**： {}\n\
             - 📍️**目的地**： {}\n\
             - ⚖️️**重量**： {}kg\n\
             **价格详情**{}",
            self.kuaidi_name,
            self.from,
            self.to,
            self.weight,
            markdown_table(headers, &rows)
        )
    }
}

impl FailureResult {
    pub fn markdown(&self) -> String {
        format!("- ⚠️**异常信息**： {}", self.message)
    }
}

/// Render rows as a markdown table preceded by a blank line.
fn markdown_table(headers: &[&str], rows: &[Vec<&str>]) -> String {
    let mut out = String::from("\n\n");
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", " --- |".repeat(headers.len())));
    for row in rows {
        let cells: Vec<String> = row.iter().map(|c| escape_cell(c)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}
