//! Pre-shipment delivery-time estimation tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::tools::handlers::LogisticsTool;
use crate::domains::tools::upstream::UpstreamMethod;

/// Parameters for delivery-time estimation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EstimateTimeParams {
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
        description = "下单时间，格式要求yyyy-MM-dd HH:mm:ss，例如：2023-08-08 08:08:08；如果没有传入则取当前时间；填写明天或者后天等情况，则以今天为基准日"
    )]
    #[serde(default)]
    pub order_time: String,

    #[schemars(description = "业务或产品类型，如：标准快递")]
    #[serde(default)]
    pub exp_type: String,
}

/// Estimates when a parcel sent now would arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateTimeTool;

impl LogisticsTool for EstimateTimeTool {
    const NAME: &'static str = "estimate_time";

    const DESCRIPTION: &'static str = "通过快递公司编码、收寄件地址、下单时间和业务/产品类型来预估快递可送达的时间，以及过程需要花费的时间；用于寄件前快递送达时间预估";

    const METHOD: UpstreamMethod = UpstreamMethod::EstimateTime;

    const REQUIRED: &'static [&'static str] = &["kuaidi_com", "from", "to"];

    type Params = EstimateTimeParams;

    fn upstream_params(params: EstimateTimeParams) -> Vec<(&'static str, String)> {
        vec![
            ("kuaidicom", params.kuaidi_com),
            ("from", params.from),
            ("to", params.to),
            ("orderTime", params.order_time),
            ("expType", params.exp_type),
        ]
    }
}
