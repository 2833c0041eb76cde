use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// An order as served by the upstream data source.
///
/// `created_at` is kept as a string so that a single bad timestamp does not
/// fail decoding of the whole batch. `status` is stored verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub created_at: String,
    pub status: String,
    pub value: f64,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder {
    pub order_id: String,
    pub created_at: NaiveDateTime,
    pub status: String,
    pub value: BigDecimal,
    pub payment_method: String,
}

#[derive(Debug, Error)]
pub enum RowError {
    #[error("invalid created_at '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid value {0}")]
    InvalidValue(f64),
}

impl TryFrom<&Order> for NewOrder {
    type Error = RowError;

    fn try_from(order: &Order) -> Result<Self, Self::Error> {
        // TIMESTAMP column: keep the wall-clock time, drop the offset.
        let created_at = DateTime::parse_from_rfc3339(&order.created_at)
            .map_err(|source| RowError::InvalidTimestamp {
                value: order.created_at.clone(),
                source,
            })?
            .naive_local();
        let value = BigDecimal::from_str(&order.value.to_string())
            .map_err(|_| RowError::InvalidValue(order.value))?;

        Ok(Self {
            order_id: order.order_id.clone(),
            created_at,
            status: order.status.clone(),
            value,
            payment_method: order.payment_method.clone(),
        })
    }
}
