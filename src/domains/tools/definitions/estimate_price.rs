//! Shipping price estimation tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::handlers::LogisticsTool;
use crate::domains::tools::upstream::UpstreamMethod;

/// Parameters for price estimation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EstimatePriceParams {
    #[schemars(
        description = "快递公司的编码，一律用小写字母；目前仅支持：顺丰:shunfeng, 京东:jd, 德邦快递:debangkuaidi, 圆通:yuantong, 中通:zhongtong, 申通:shentong, 韵达:yunda, EMS:ems"
    )]
    pub kuaidi_com: String,

    #[schemars(
        description = "收件地址，如广东深圳南山区；如果没有省市信息的话请补全，如广东深圳改为广东省深圳市。如果用户没告知收件地址，则不调用服务，继续追问用户收件地址是哪里"
    )]
    pub rec_addr: String,

    #[schemars(
        description = "寄件地址，如北京海淀区；如果没有省市信息的话请补全，如广东深圳改为广东省深圳市。如果用户没告知寄件地址，则不调用服务，继续追问用户寄件地址是哪里"
    )]
    pub send_addr: String,

    #[schemars(description = "重量，默认单位为kg，参数无需带单位，如1.0；默认重量为1kg")]
    pub weight: String,
}

/// Estimates the freight for a carrier, route and weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatePriceTool;

impl LogisticsTool for EstimatePriceTool {
    const NAME: &'static str = "estimate_price";

    const DESCRIPTION: &'static str = "通过快递公司、收寄件地址和重量，预估快递公司运费";

    const METHOD: UpstreamMethod = UpstreamMethod::EstimatePrice;

    const REQUIRED: &'static [&'static str] = &["kuaidi_com", "rec_addr", "send_addr", "weight"];

    type Params = EstimatePriceParams;

    fn upstream_params(params: EstimatePriceParams) -> Vec<(&'static str, String)> {
        vec![
            ("kuaidicom", params.kuaidi_com),
            ("recAddr", params.rec_addr),
            ("sendAddr", params.send_addr),
            ("weight", params.weight),
        ]
    }
}
