use crate::entities::subscription_entity as subscriptions;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::period_query::PeriodQuery;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, Set,
};

pub struct SubscriptionService {
    pool: DatabaseConnection,
}

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    total: i64,
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Subscription {id} does not exist"))
}

fn active_model(sub: &Subscription) -> subscriptions::ActiveModel {
    subscriptions::ActiveModel {
        subscription_id: NotSet,
        service_name: Set(sub.service_name.clone()),
        price: Set(sub.price),
        user_id: Set(sub.user_id),
        start_date: Set(sub.start_date.clone()),
        end_date: Set(sub.end_date.clone()),
    }
}

impl SubscriptionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Inserts a subscription and returns its generated id.
    pub async fn create(&self, sub: &Subscription) -> AppResult<i64> {
        log::debug!("Inserting subscription for service {}", sub.service_name);
        let res = subscriptions::Entity::insert(active_model(sub))
            .exec(&self.pool)
            .await?;
        Ok(res.last_insert_id)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Subscription> {
        subscriptions::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .map(Subscription::from)
            .ok_or_else(|| not_found(id))
    }

    /// Overwrites every field of the row in a single statement.
    pub async fn update_by_id(&self, id: i64, sub: &Subscription) -> AppResult<()> {
        let res = subscriptions::Entity::update_many()
            .set(active_model(sub))
            .filter(subscriptions::Column::SubscriptionId.eq(id))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let res = subscriptions::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub async fn list_all(&self) -> AppResult<Vec<Subscription>> {
        let rows = subscriptions::Entity::find()
            .order_by_asc(subscriptions::Column::SubscriptionId)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Subscription::from).collect())
    }

    /// Sums prices of subscriptions that start and end within the filter's period.
    /// Open-ended subscriptions only need to start in or after its first month.
    pub async fn sum_price_in_period(&self, filter: &PeriodFilter) -> AppResult<i64> {
        let stmt = PeriodQuery::from_filter(filter)?.into_statement();
        let total = TotalRow::find_by_statement(stmt)
            .one(&self.pool)
            .await?
            .map(|r| r.total)
            .unwrap_or(0);
        Ok(total)
    }
}
