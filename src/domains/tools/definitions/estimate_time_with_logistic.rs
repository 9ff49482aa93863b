//! In-transit delivery-time estimation tool, using the trace history.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::handlers::LogisticsTool;
use crate::domains::tools::upstream::UpstreamMethod;

/// Parameters for in-transit delivery-time estimation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EstimateTimeWithLogisticParams {
    #[schemars(
        description = "快递公司编码，一律用小写字母；目前仅支持：京东:jd, 跨越:kuayue, 顺丰:shunfeng, 顺丰快运:shunfengkuaiyun, 中通:zhongtong, 德邦快递:debangkuaidi, EMS:ems, EMS-国际件:emsguoji, 邮政国内:youzhengguonei, 国际包裹:youzhengguoji, 申通:shentong, 圆通:yuantong, 韵达:yunda, 宅急送:zhaijisong, 芝麻开门:zhimakaimen, 联邦快递:lianbangkuaidi, 天地华宇:tiandihuayu, 安能快运:annengwuliu, 京广速递:jinguangsudikuaijian, 加运美:jiayunmeiwuliu, 极兔速递:jtexpress"
    )]
    pub kuaidi_com: String,

    #[schemars(
        description = "出发地（地址需包含3级及以上），例如：广东深圳南山区；如果没有省市区信息的话请补全，如广东深圳改为广东省深圳市南山区"
    )]
    pub from: String,

    #[schemars(
        description = "目的地（地址需包含3级及以上），例如：北京海淀区；如果没有省市区信息的话请补全。如果用户没告知目的地，则不调用服务，继续追问用户目的地是哪里"
    )]
    pub to: String,

    #[schemars(
        description = "下单时间，格式要求yyyy-MM-dd HH:mm:ss，例如：2023-08-08 08:08:08；取query_trace服务返回数据中最早物流轨迹的时间即可"
    )]
    pub order_time: String,

    #[schemars(description = "业务或产品类型，如：标准快递")]
    #[serde(default)]
    pub exp_type: String,

    #[schemars(
        description = "历史物流轨迹信息，用于预测在途时还需多长时间到达；一般情况下取query_trace服务返回数据的data数组转为JSON字符串即可，如：[{\"time\":\"2025-05-09 13:15:26\",\"context\":\"您的快件离开【吉林省吉林市桦甸市】，已发往【长春转运中心】\"},{\"time\":\"2025-05-09 12:09:38\",\"context\":\"您的快件在【吉林省吉林市桦甸市】已揽收\"}]；time为物流轨迹节点的时间，context为在该物流轨迹节点的描述"
    )]
    pub logistic: String,
}

/// Estimates the arrival of a parcel already in transit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateTimeWithLogisticTool;

impl LogisticsTool for EstimateTimeWithLogisticTool {
    const NAME: &'static str = "estimate_time_with_logistic";

    const DESCRIPTION: &'static str = "通过快递公司编码、收寄件地址、下单时间和业务/产品类型、历史物流轨迹信息来预估快递送达的时间；用于在途快递的到达时间预估。接口返回的now属性为当前时间，使用arrivalTime-now计算预计还需运输时间";

    const METHOD: UpstreamMethod = UpstreamMethod::EstimateTimeWithLogistic;

    const REQUIRED: &'static [&'static str] = &["kuaidi_com", "from", "to", "order_time", "logistic"];

    type Params = EstimateTimeWithLogisticParams;

    fn upstream_params(params: EstimateTimeWithLogisticParams) -> Vec<(&'static str, String)> {
        vec![
            ("kuaidicom", params.kuaidi_com),
            ("from", params.from),
            ("to", params.to),
            ("orderTime", params.order_time),
            ("expType", params.exp_type),
            ("logistic", params.logistic),
        ]
    }
}
