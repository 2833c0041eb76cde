use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Numeric, Varchar};
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use shared::OrderStatus;
use crate::filter::Filters;

/// One `GROUP BY status` row of `aggregated.daily_metrics`.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct StatusTotals {
    #[diesel(sql_type = Varchar)]
    pub status: String,
    #[diesel(sql_type = BigInt)]
    pub total_orders: i64,
    #[diesel(sql_type = Numeric)]
    pub total_value: BigDecimal,
}

/// One `GROUP BY date` row with each status pivoted into its own column.
#[derive(Debug, Clone, PartialEq, QueryableByName)]
pub struct DailyMetrics {
    #[diesel(sql_type = Date)]
    pub date: NaiveDate,
    #[diesel(sql_type = Numeric)]
    pub approved_revenue: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub pending_revenue: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub cancelled_revenue: BigDecimal,
    #[diesel(sql_type = BigInt)]
    pub approved_orders: i64,
    #[diesel(sql_type = BigInt)]
    pub pending_orders: i64,
    #[diesel(sql_type = BigInt)]
    pub cancelled_orders: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub approved_revenue: f64,
    pub pending_revenue: f64,
    pub cancelled_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationalMetrics {
    pub approved_orders: i64,
    pub pending_orders: i64,
    pub cancelled_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub filters: Filters,
    pub financial_metrics: FinancialMetrics,
    pub operational_metrics: OperationalMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub approved_revenue: f64,
    pub pending_revenue: f64,
    pub cancelled_revenue: f64,
    pub approved_orders: i64,
    pub pending_orders: i64,
    pub cancelled_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesResponse {
    pub filters: Filters,
    pub data: Vec<TimeSeriesPoint>,
}

fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

impl MetricsResponse {
    /// Buckets missing from `totals` stay at zero; unknown statuses are ignored.
    pub fn from_totals(filters: Filters, totals: &[StatusTotals]) -> Self {
        let mut financial = FinancialMetrics::default();
        let mut operational = OperationalMetrics::default();

        for row in totals {
            let revenue = to_f64(&row.total_value);
            match row.status.parse::<OrderStatus>() {
                Ok(OrderStatus::Approved) => {
                    financial.approved_revenue = revenue;
                    operational.approved_orders = row.total_orders;
                }
                Ok(OrderStatus::Pending) => {
                    financial.pending_revenue = revenue;
                    operational.pending_orders = row.total_orders;
                }
                Ok(OrderStatus::Cancelled) => {
                    financial.cancelled_revenue = revenue;
                    operational.cancelled_orders = row.total_orders;
                }
                Err(e) => tracing::debug!("Ignoring metrics row: {}", e),
            }
        }

        Self {
            filters,
            financial_metrics: financial,
            operational_metrics: operational,
        }
    }
}

impl From<&DailyMetrics> for TimeSeriesPoint {
    fn from(row: &DailyMetrics) -> Self {
        Self {
            date: row.date.format("%Y-%m-%d").to_string(),
            approved_revenue: to_f64(&row.approved_revenue),
            pending_revenue: to_f64(&row.pending_revenue),
            cancelled_revenue: to_f64(&row.cancelled_revenue),
            approved_orders: row.approved_orders,
            pending_orders: row.pending_orders,
            cancelled_orders: row.cancelled_orders,
        }
    }
}

impl TimeSeriesResponse {
    pub fn from_rows(filters: Filters, rows: &[DailyMetrics]) -> Self {
        Self {
            filters,
            data: rows.iter().map(TimeSeriesPoint::from).collect(),
        }
    }
}
