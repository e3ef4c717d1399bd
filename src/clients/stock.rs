use std::path::{Path, PathBuf};

use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    clients::delay::{Delay, TokioDelay},
    config::Config,
    models::{
        retry::{RetryConfig, Transient},
        stock::StockRecord,
        upstream::{FeedDocument, ProductSnapshot},
    },
    utils::retry_with_backoff,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("product feed request failed: {0}")]
    Request(String),

    #[error("product feed returned status {0}")]
    Status(u16),

    #[error("failed to parse product feed: {0}")]
    Decode(String),
}

impl Transient for FetchError {
    /// Connection trouble, throttling and server errors may clear up; a bad
    /// URL or an unreadable feed will not.
    fn is_transient(&self) -> bool {
        match self {
            FetchError::Request(_) => true,
            FetchError::Status(status) => *status == 429 || *status >= 500,
            FetchError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockLookup {
    Found(StockRecord),
    ProductNotLoaded,
}

/// Pulls the drop feed and turns the tracked product into a [`StockRecord`].
pub struct StockClient<D = TokioDelay> {
    http_client: Client,
    api_url: String,
    retry_config: RetryConfig,
    snapshot_path: Option<PathBuf>,
    delay: D,
}

impl StockClient<TokioDelay> {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(api_url = %config.api_url, "Stock client initialized");

        let client = Self::with_client(http_client, &config.api_url, config.retry_config());
        Ok(match &config.snapshot_path {
            Some(path) => client.with_snapshot_path(path.clone()),
            None => client,
        })
    }

    pub fn with_client(http_client: Client, api_url: &str, retry_config: RetryConfig) -> Self {
        Self {
            http_client,
            api_url: api_url.to_string(),
            retry_config,
            snapshot_path: None,
            delay: TokioDelay,
        }
    }
}

impl<D: Delay> StockClient<D> {
    /// Swaps the backoff timer, mostly so tests can observe the waits.
    pub fn with_delay<N: Delay>(self, delay: N) -> StockClient<N> {
        StockClient {
            http_client: self.http_client,
            api_url: self.api_url,
            retry_config: self.retry_config,
            snapshot_path: self.snapshot_path,
            delay,
        }
    }

    pub fn with_snapshot_path(mut self, path: PathBuf) -> Self {
        self.snapshot_path = Some(path);
        self
    }

    pub async fn lookup(&self, sku: &str) -> Result<StockLookup, FetchError> {
        let feed = self.fetch_feed().await?;

        if let Some(path) = &self.snapshot_path {
            write_snapshot(&feed, path).await;
        }

        Ok(select_product(&feed, sku))
    }

    pub async fn fetch_feed(&self) -> Result<FeedDocument, FetchError> {
        retry_with_backoff(&self.retry_config, &self.delay, || {
            let client = self.http_client.clone();
            let url = self.api_url.clone();

            async move {
                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Request(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status(status.as_u16()));
                }

                response
                    .json::<FeedDocument>()
                    .await
                    .map_err(|e| FetchError::Decode(e.to_string()))
            }
        })
        .await
    }
}

pub fn select_product(feed: &FeedDocument, sku: &str) -> StockLookup {
    match feed.find_active(sku) {
        Some(product) => {
            let record = product.to_stock_record();
            debug!(
                sku,
                title = %record.title,
                sizes = record.size_stock.len(),
                "Matched product in feed"
            );
            StockLookup::Found(record)
        }
        None => StockLookup::ProductNotLoaded,
    }
}

async fn write_snapshot(feed: &FeedDocument, path: &Path) {
    let snapshots: Vec<ProductSnapshot> = feed.active_products().map(|p| p.snapshot()).collect();

    let bytes = match serde_json::to_vec_pretty(&snapshots) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Failed to serialize product snapshot");
            return;
        }
    };

    match tokio::fs::write(path, bytes).await {
        Ok(()) => info!(
            path = %path.display(),
            products = snapshots.len(),
            "Product snapshot written"
        ),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to write product snapshot"),
    }
}
