//! In-memory stand-ins for `aggregated.daily_metrics` and the token issuer.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::auth::Claims;
use crate::filter::MetricsFilter;
use crate::models::{DailyMetrics, StatusTotals};
use crate::store::{MetricsStore, StoreError};

pub const SECRET: &str = "test-shared-secret";

pub fn token(algorithm: Algorithm, secret: &str, claims: &Claims) -> String {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn valid_token() -> String {
    let now = get_current_timestamp();
    token(
        Algorithm::HS256,
        SECRET,
        &Claims {
            username: Some("admin".to_string()),
            exp: Some(now + 3600),
            iat: Some(now),
        },
    )
}

#[derive(Debug, Clone)]
pub struct MetricRecord {
    pub date: NaiveDate,
    pub status: String,
    pub payment_method: String,
    pub total_orders: i64,
    pub total_value: BigDecimal,
}

pub fn record(date: &str, status: &str, payment_method: &str, orders: i64, value: &str) -> MetricRecord {
    MetricRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        status: status.to_string(),
        payment_method: payment_method.to_string(),
        total_orders: orders,
        total_value: BigDecimal::from_str(value).unwrap(),
    }
}

fn selects(filter: &MetricsFilter, record: &MetricRecord) -> bool {
    filter.start_date.map_or(true, |start| record.date >= start)
        && filter.end_date.map_or(true, |end| record.date <= end)
        && filter
            .payment_method
            .as_ref()
            .map_or(true, |method| &record.payment_method == method)
}

#[derive(Default)]
pub struct MemoryMetricsStore {
    records: Vec<MetricRecord>,
    failing: bool,
    queries: AtomicUsize,
}

impl MemoryMetricsStore {
    pub fn with_records(records: Vec<MetricRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetricsStore for MemoryMetricsStore {
    async fn totals_by_status(&self, filter: &MetricsFilter) -> Result<Vec<StatusTotals>, StoreError> {
        self.begin()?;
        let mut groups: BTreeMap<String, StatusTotals> = BTreeMap::new();
        for record in self.records.iter().filter(|r| selects(filter, r)) {
            let entry = groups.entry(record.status.clone()).or_insert_with(|| StatusTotals {
                status: record.status.clone(),
                total_orders: 0,
                total_value: BigDecimal::from(0),
            });
            entry.total_orders += record.total_orders;
            entry.total_value += &record.total_value;
        }
        Ok(groups.into_values().collect())
    }

    async fn daily_series(&self, filter: &MetricsFilter) -> Result<Vec<DailyMetrics>, StoreError> {
        self.begin()?;
        let mut days: BTreeMap<NaiveDate, DailyMetrics> = BTreeMap::new();
        for record in self.records.iter().filter(|r| selects(filter, r)) {
            let day = days.entry(record.date).or_insert_with(|| DailyMetrics {
                date: record.date,
                approved_revenue: BigDecimal::from(0),
                pending_revenue: BigDecimal::from(0),
                cancelled_revenue: BigDecimal::from(0),
                approved_orders: 0,
                pending_orders: 0,
                cancelled_orders: 0,
            });
            match record.status.as_str() {
                "approved" => {
                    day.approved_revenue += &record.total_value;
                    day.approved_orders += record.total_orders;
                }
                "pending" => {
                    day.pending_revenue += &record.total_value;
                    day.pending_orders += record.total_orders;
                }
                "cancelled" => {
                    day.cancelled_revenue += &record.total_value;
                    day.cancelled_orders += record.total_orders;
                }
                _ => {}
            }
        }
        Ok(days.into_values().collect())
    }
}
