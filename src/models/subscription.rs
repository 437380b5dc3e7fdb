use crate::entities::subscription_entity;
use crate::error::ValidationError;
use crate::utils::month::{parse_month, validate_date};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Subscription payload as accepted and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subscription {
    #[schema(example = "Yandex Plus")]
    pub service_name: String,
    #[schema(example = 400)]
    pub price: i32,
    #[serde(default)]
    #[schema(example = "60601fee-2bf1-4721-ae6f-7636e79a0cba")]
    pub user_id: Uuid,
    #[schema(example = "07-2025")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "12-2025")]
    pub end_date: Option<String>,
}

impl Subscription {
    /// Price first, then start date, then end date and finally date order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.price < 0 {
            return Err(ValidationError::NegativePrice);
        }
        validate_date(&self.start_date)?;
        if let Some(end_date) = &self.end_date {
            validate_date(end_date)?;
            check_date_order(&self.start_date, end_date)?;
        }
        Ok(())
    }
}

/// Fails when `end_date` is strictly earlier than `start_date` (both `MM-YYYY`).
pub fn check_date_order(start_date: &str, end_date: &str) -> Result<(), ValidationError> {
    let start = parse_month(start_date)?;
    let end = parse_month(end_date)?;
    if end < start {
        return Err(ValidationError::DateOrderViolation);
    }
    Ok(())
}

impl From<subscription_entity::Model> for Subscription {
    fn from(m: subscription_entity::Model) -> Self {
        Self {
            service_name: m.service_name,
            price: m.price,
            user_id: m.user_id,
            start_date: m.start_date,
            end_date: m.end_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionResponse {
    pub subscription_id: i64,
}

/// Query string of `GET /api/total`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TotalQuery {
    /// Period start, MM-YYYY
    pub start_date: Option<String>,
    /// Period end, MM-YYYY
    pub end_date: Option<String>,
    /// Only count subscriptions of this user
    pub user_id: Option<String>,
    /// Only count subscriptions of this service
    pub service_name: Option<String>,
}

/// Validated filter for summing prices over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodFilter {
    pub start_date: String,
    pub end_date: String,
    /// `Uuid::nil()` disables the user filter.
    pub user_id: Uuid,
    /// Empty disables the service filter.
    pub service_name: String,
}

impl PeriodFilter {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_date(&self.start_date)?;
        validate_date(&self.end_date)?;
        check_date_order(&self.start_date, &self.end_date)
    }
}
