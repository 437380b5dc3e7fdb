use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub subscription_id: i64,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    /// MM-YYYY
    pub start_date: String,
    /// MM-YYYY, `None` for open-ended subscriptions
    pub end_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
