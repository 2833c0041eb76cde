//! In-memory collaborators for pipeline and router tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use crate::models::{NewOrder, Order};
use crate::store::{InsertError, InsertOutcome, OrderStore};
use crate::upstream::{OrderSource, Transformer, UpstreamError};

pub fn order(order_id: &str, created_at: &str, status: &str) -> Order {
    Order {
        order_id: order_id.to_string(),
        created_at: created_at.to_string(),
        status: status.to_string(),
        value: 100.0,
        payment_method: "credit_card".to_string(),
    }
}

pub enum FakeSource {
    Orders(Vec<Order>),
    Status(u16),
}

impl FakeSource {
    pub fn orders(orders: Vec<Order>) -> Self {
        FakeSource::Orders(orders)
    }

    pub fn status(code: u16) -> Self {
        FakeSource::Status(code)
    }
}

#[async_trait]
impl OrderSource for FakeSource {
    async fn fetch_orders(&self) -> Result<Vec<Order>, UpstreamError> {
        match self {
            FakeSource::Orders(orders) => Ok(orders.clone()),
            FakeSource::Status(code) => Err(UpstreamError::Status(*code)),
        }
    }
}

/// Mirrors the `UNIQUE(order_id)` constraint of `raw_data.orders`.
#[derive(Default)]
pub struct MemoryStore {
    ids: Mutex<HashSet<String>>,
    reject: Option<String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn rejecting(order_id: &str) -> Self {
        Self {
            reject: Some(order_id.to_string()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, InsertError> {
        if self.unavailable {
            return Err(InsertError::Unavailable("connection refused".to_string()));
        }
        if self.reject.as_deref() == Some(order.order_id.as_str()) {
            return Err(InsertError::Rejected("numeric field overflow".to_string()));
        }
        if self.ids.lock().unwrap().insert(order.order_id.clone()) {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Duplicate)
        }
    }
}

#[derive(Default)]
pub struct RecordingTransformer {
    calls: AtomicUsize,
    fail: bool,
}

impl RecordingTransformer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transformer for RecordingTransformer {
    async fn notify(&self) -> Result<(), UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(UpstreamError::Status(500))
        } else {
            Ok(())
        }
    }
}
