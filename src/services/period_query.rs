//! Builds the `SUM(price)` statement for a period with optional filters.
//!
//! Clauses are appended as typed [`Predicate`]s. Each one binds its value to the
//! next `$n` placeholder, so the SQL text never contains user input.

use crate::error::AppResult;
use crate::models::PeriodFilter;
use crate::utils::month::parse_month;
use chrono::NaiveDate;
use sea_orm::{DbBackend, Statement, Value};
use uuid::Uuid;

const START_MONTH: &str = "TO_DATE('01-' || start_date, 'DD-MM-YYYY')";
const END_MONTH: &str = "TO_DATE('01-' || end_date, 'DD-MM-YYYY')";

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Subscription starts in or after the period's first month.
    StartsFrom(NaiveDate),
    /// Subscription ends in or before the period's last month, or is open-ended.
    EndsBy(NaiveDate),
    UserIs(Uuid),
    ServiceIs(String),
}

impl Predicate {
    fn render(&self, placeholder: &str) -> String {
        match self {
            Predicate::StartsFrom(_) => format!("{START_MONTH} >= {placeholder}"),
            Predicate::EndsBy(_) => {
                format!("({END_MONTH} <= {placeholder} OR end_date IS NULL)")
            }
            Predicate::UserIs(_) => format!("user_id = {placeholder}"),
            Predicate::ServiceIs(_) => format!("service_name = {placeholder}"),
        }
    }

    fn value(&self) -> Value {
        match self {
            Predicate::StartsFrom(d) | Predicate::EndsBy(d) => (*d).into(),
            Predicate::UserIs(id) => (*id).into(),
            Predicate::ServiceIs(name) => name.clone().into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PeriodQuery {
    predicates: Vec<Predicate>,
}

impl PeriodQuery {
    /// Base query for subscriptions starting no earlier than `start` and ending no
    /// later than `end`. Open-ended subscriptions are never cut by `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            predicates: vec![Predicate::StartsFrom(start), Predicate::EndsBy(end)],
        }
    }

    /// Parses the filter's months and adds the optional filters.
    pub fn from_filter(filter: &PeriodFilter) -> AppResult<Self> {
        let start = parse_month(&filter.start_date)?;
        let end = parse_month(&filter.end_date)?;
        Ok(Self::new(start, end)
            .user(filter.user_id)
            .service(&filter.service_name))
    }

    /// Nil UUID leaves the query unfiltered by user.
    pub fn user(self, user_id: Uuid) -> Self {
        if user_id.is_nil() {
            return self;
        }
        self.and(Predicate::UserIs(user_id))
    }

    /// Empty name leaves the query unfiltered by service.
    pub fn service(self, service_name: &str) -> Self {
        if service_name.is_empty() {
            return self;
        }
        self.and(Predicate::ServiceIs(service_name.to_string()))
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn sql(&self) -> String {
        let mut sql =
            String::from("SELECT CAST(COALESCE(SUM(price), 0) AS BIGINT) AS total FROM subscriptions");
        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&predicate.render(&format!("${}", i + 1)));
        }
        sql
    }

    pub fn values(&self) -> Vec<Value> {
        self.predicates.iter().map(Predicate::value).collect()
    }

    pub fn into_statement(self) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, self.sql(), self.values())
    }
}
