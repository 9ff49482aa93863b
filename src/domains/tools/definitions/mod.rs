//! Tool definitions module.
//!
//! One file per tool. Each exports its params type and a zero-sized tool
//! type implementing [`LogisticsTool`](super::handlers::LogisticsTool).

pub mod estimate_price;
pub mod estimate_time;
pub mod estimate_time_with_logistic;
pub mod query_trace;

pub use estimate_price::{EstimatePriceParams, EstimatePriceTool};
pub use estimate_time::{EstimateTimeParams, EstimateTimeTool};
pub use estimate_time_with_logistic::{EstimateTimeWithLogisticParams, EstimateTimeWithLogisticTool};
pub use query_trace::{QueryTraceParams, QueryTraceTool};
