use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{pooled_connection::bb8::Pool, AsyncPgConnection, RunQueryDsl};
use thiserror::Error;
use crate::models::NewOrder;
use crate::schema::orders;

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

#[derive(Debug, Error)]
pub enum InsertError {
    /// The store cannot be reached at all; the remaining batch is pointless.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// This row was refused; other rows may still succeed.
    #[error("insert rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, InsertError>;
}

pub struct PgOrderStore {
    pool: DbPool,
}

impl PgOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &NewOrder) -> Result<InsertOutcome, InsertError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| InsertError::Unavailable(e.to_string()))?;

        let affected = diesel::insert_into(orders::table)
            .values(order)
            .on_conflict(orders::order_id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|e| InsertError::Rejected(e.to_string()))?;

        if affected > 0 {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::Duplicate)
        }
    }
}
