//! Shipment trace lookup tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::handlers::LogisticsTool;
use crate::domains::tools::upstream::UpstreamMethod;

/// Parameters for the trace lookup tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryTraceParams {
    #[schemars(description = "待查询的快递单号")]
    pub kuaidi_num: String,

    #[schemars(description = "手机号，非必填；顺丰速运、顺丰快运、中通快递查询时需要填入")]
    #[serde(default)]
    pub phone: String,
}

/// Real-time trace lookup by tracking number.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryTraceTool;

impl LogisticsTool for QueryTraceTool {
    const NAME: &'static str = "query_trace";

    const DESCRIPTION: &'static str =
        "查询物流轨迹服务，传入快递单号和手机号，获取对应快递的实时物流轨迹";

    const METHOD: UpstreamMethod = UpstreamMethod::QueryTrace;

    const REQUIRED: &'static [&'static str] = &["kuaidi_num"];

    type Params = QueryTraceParams;

    fn upstream_params(params: QueryTraceParams) -> Vec<(&'static str, String)> {
        vec![("kuaidiNum", params.kuaidi_num), ("phone", params.phone)]
    }
}
