use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use crate::models::{NewOrder, Order};
use crate::store::{InsertError, InsertOutcome, OrderStore};
use crate::upstream::{OrderSource, Transformer, UpstreamError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub order_id: String,
    pub reason: String,
}

/// Outcome of inserting one fetched batch. Rows that conflict on `order_id`
/// count as duplicates, never as failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformerOutcome {
    Skipped,
    Notified,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub total: usize,
    pub report: BatchReport,
    pub transformer: TransformerOutcome,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch orders: {0}")]
    Fetch(#[from] UpstreamError),

    #[error("failed to insert orders: {0}")]
    Store(String),
}

pub struct Pipeline {
    source: Arc<dyn OrderSource>,
    store: Arc<dyn OrderStore>,
    transformer: Arc<dyn Transformer>,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn OrderSource>,
        store: Arc<dyn OrderStore>,
        transformer: Arc<dyn Transformer>,
    ) -> Self {
        Self { source, store, transformer }
    }

    /// Fetch, insert, and (when anything new landed) notify the transformer.
    pub async fn run(&self) -> Result<PipelineRun, PipelineError> {
        info!("Fetching orders from data source");
        let orders = self.source.fetch_orders().await?;
        info!("Received {} orders from data source", orders.len());

        let report = self.ingest(&orders).await?;
        info!(
            "Inserted {} orders ({} duplicates, {} failed)",
            report.inserted,
            report.duplicates,
            report.failures.len()
        );

        let transformer = if report.inserted > 0 {
            self.notify_transformer().await
        } else {
            TransformerOutcome::Skipped
        };

        Ok(PipelineRun {
            total: orders.len(),
            report,
            transformer,
        })
    }

    async fn ingest(&self, orders: &[Order]) -> Result<BatchReport, PipelineError> {
        let mut report = BatchReport::default();

        for order in orders {
            let row = match NewOrder::try_from(order) {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping order {}: {}", order.order_id, e);
                    report.failures.push(RowFailure {
                        order_id: order.order_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match self.store.insert(&row).await {
                Ok(InsertOutcome::Inserted) => report.inserted += 1,
                Ok(InsertOutcome::Duplicate) => report.duplicates += 1,
                Err(InsertError::Rejected(reason)) => {
                    warn!("Failed to insert order {}: {}", order.order_id, reason);
                    report.failures.push(RowFailure {
                        order_id: order.order_id.clone(),
                        reason,
                    });
                }
                Err(e @ InsertError::Unavailable(_)) => {
                    return Err(PipelineError::Store(e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn notify_transformer(&self) -> TransformerOutcome {
        info!("Calling transformer to refresh aggregates");
        match self.transformer.notify().await {
            Ok(()) => {
                info!("Transformer completed");
                TransformerOutcome::Notified
            }
            Err(e) => {
                warn!("Transformer call failed: {}", e);
                TransformerOutcome::Failed(e.to_string())
            }
        }
    }
}
