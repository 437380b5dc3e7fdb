pub mod period_query;
pub mod subscription_service;

pub use period_query::PeriodQuery;
pub use subscription_service::*;
