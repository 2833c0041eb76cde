use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{Date, Text};
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};
use thiserror::Error;
use crate::filter::{Bind, MetricsFilter};
use crate::models::{DailyMetrics, StatusTotals};

pub type DbPool = Pool<AsyncPgConnection>;

const TOTALS_BY_STATUS_SQL: &str = "\
SELECT status, \
    SUM(total_orders) AS total_orders, \
    SUM(total_value) AS total_value \
FROM aggregated.daily_metrics \
WHERE 1=1";

const DAILY_SERIES_SQL: &str = "\
SELECT date, \
    SUM(CASE WHEN status = 'approved' THEN total_value ELSE 0 END) AS approved_revenue, \
    SUM(CASE WHEN status = 'pending' THEN total_value ELSE 0 END) AS pending_revenue, \
    SUM(CASE WHEN status = 'cancelled' THEN total_value ELSE 0 END) AS cancelled_revenue, \
    SUM(CASE WHEN status = 'approved' THEN total_orders ELSE 0 END) AS approved_orders, \
    SUM(CASE WHEN status = 'pending' THEN total_orders ELSE 0 END) AS pending_orders, \
    SUM(CASE WHEN status = 'cancelled' THEN total_orders ELSE 0 END) AS cancelled_orders \
FROM aggregated.daily_metrics \
WHERE 1=1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Read access to the transformer-owned `aggregated.daily_metrics` table.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    async fn totals_by_status(&self, filter: &MetricsFilter) -> Result<Vec<StatusTotals>, StoreError>;

    /// Rows are ordered by ascending date.
    async fn daily_series(&self, filter: &MetricsFilter) -> Result<Vec<DailyMetrics>, StoreError>;
}

pub struct PgMetricsStore {
    pool: DbPool,
}

impl PgMetricsStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered_query(base: &str, filter: &MetricsFilter, tail: &str) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
    let predicate = filter.predicate();
    let sql = format!("{}{} {}", base, predicate.sql, tail);

    let mut query: BoxedSqlQuery<'static, Pg, SqlQuery> = diesel::sql_query(sql).into_boxed();
    for bind in predicate.binds {
        query = match bind {
            Bind::Date(date) => query.bind::<Date, _>(date),
            Bind::Text(text) => query.bind::<Text, _>(text),
        };
    }
    query
}

#[async_trait]
impl MetricsStore for PgMetricsStore {
    async fn totals_by_status(&self, filter: &MetricsFilter) -> Result<Vec<StatusTotals>, StoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let rows = filtered_query(TOTALS_BY_STATUS_SQL, filter, "GROUP BY status")
            .load::<StatusTotals>(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn daily_series(&self, filter: &MetricsFilter) -> Result<Vec<DailyMetrics>, StoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let rows = filtered_query(DAILY_SERIES_SQL, filter, "GROUP BY date ORDER BY date")
            .load::<DailyMetrics>(&mut conn)
            .await?;
        Ok(rows)
    }
}
