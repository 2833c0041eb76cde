use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use crate::models::Order;

/// Applied to both the data source fetch and the transformer call.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("failed to decode JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<Order>, UpstreamError>;
}

#[async_trait]
pub trait Transformer: Send + Sync {
    async fn notify(&self) -> Result<(), UpstreamError>;
}

pub fn build_client() -> reqwest::Result<Client> {
    Client::builder().timeout(UPSTREAM_TIMEOUT).build()
}

pub struct HttpOrderSource {
    client: Client,
    url: String,
}

impl HttpOrderSource {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl OrderSource for HttpOrderSource {
    async fn fetch_orders(&self) -> Result<Vec<Order>, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        response
            .json::<Vec<Order>>()
            .await
            .map_err(UpstreamError::Decode)
    }
}

pub struct HttpTransformer {
    client: Client,
    url: String,
}

impl HttpTransformer {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Transformer for HttpTransformer {
    async fn notify(&self) -> Result<(), UpstreamError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        if response.status() != StatusCode::OK {
            return Err(UpstreamError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}
