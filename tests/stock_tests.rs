use anyhow::Result;
use reqwest::Client;
use restock_notifier::{
    clients::stock::{FetchError, StockClient, StockLookup, select_product},
    models::{retry::RetryConfig, stock::SizeStock, upstream::FeedDocument},
};
use serde_json::Value;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use crate::support::{RecordingDelay, feed_document};

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_delay_ms: 10,
        max_delay_ms: 50,
        backoff_multiplier: 2,
    }
}

fn stock_client(server: &MockServer, max_attempts: u32) -> StockClient {
    StockClient::with_client(
        Client::new(),
        &format!("{}/feed", server.uri()),
        fast_retry(max_attempts),
    )
}

/// Test: Only the available, active entry with the right style color is picked
#[test]
fn test_select_product_filters_feed() -> Result<()> {
    let feed: FeedDocument = serde_json::from_value(feed_document())?;

    let StockLookup::Found(record) = select_product(&feed, "HV0823-003") else {
        panic!("Expected the product to be found");
    };

    assert_eq!(record.title, "Air Max Test");
    assert_eq!(record.sku, "HV0823-003");
    assert_eq!(record.release_channels, vec!["RAFFLE"]);
    assert_eq!(
        record.size_stock,
        vec![SizeStock::new("US 9", 3), SizeStock::new("US 10", 0)]
    );
    assert_eq!(record.photo_url, "https://img/x.png");

    Ok(())
}

/// Test: A missing product is reported, not treated as an error
#[test]
fn test_unknown_sku_is_not_loaded() -> Result<()> {
    let feed: FeedDocument = serde_json::from_value(feed_document())?;

    assert_eq!(select_product(&feed, "FZ0000-100"), StockLookup::ProductNotLoaded);

    let empty: FeedDocument = serde_json::from_str("{}")?;
    assert_eq!(select_product(&empty, "HV0823-003"), StockLookup::ProductNotLoaded);

    Ok(())
}

/// Test: Channels are used when the product has no launch view
#[test]
fn test_channels_used_without_launch_view() -> Result<()> {
    let feed: FeedDocument = serde_json::from_value(feed_document())?;

    let StockLookup::Found(record) = select_product(&feed, "DZ5485-612") else {
        panic!("Expected the product to be found");
    };

    assert_eq!(record.title, "Jordan 1");
    assert_eq!(record.release_channels, vec!["SNKRS Web"]);
    assert_eq!(record.size_stock, vec![SizeStock::new("111", 3)]);
    assert_eq!(record.photo_url, "");

    Ok(())
}

/// Test: The feed is fetched over HTTP and the product extracted
#[tokio::test]
async fn test_lookup_fetches_feed() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_document()))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = stock_client(&server, 3).lookup("HV0823-003").await?;

    assert!(matches!(lookup, StockLookup::Found(ref r) if r.sku == "HV0823-003"));

    Ok(())
}

/// Test: Transient upstream errors are retried after one backoff
#[tokio::test]
async fn test_lookup_retries_transient_errors() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_document()))
        .expect(1)
        .mount(&server)
        .await;

    let delay = RecordingDelay::default();
    let lookup = stock_client(&server, 3)
        .with_delay(delay.clone())
        .lookup("HV0823-003")
        .await?;

    assert!(matches!(lookup, StockLookup::Found(_)));
    assert_eq!(delay.waits().len(), 1);

    Ok(())
}

/// Test: A wrong feed URL is not hammered with retries
#[tokio::test]
async fn test_lookup_does_not_retry_not_found() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let delay = RecordingDelay::default();
    let result = stock_client(&server, 3)
        .with_delay(delay.clone())
        .lookup("HV0823-003")
        .await;

    assert_eq!(result, Err(FetchError::Status(404)));
    assert!(delay.waits().is_empty());

    Ok(())
}

/// Test: Persistent upstream errors surface after the last attempt
#[tokio::test]
async fn test_lookup_gives_up_after_max_attempts() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let result = stock_client(&server, 2).lookup("HV0823-003").await;

    assert_eq!(result, Err(FetchError::Status(503)));

    Ok(())
}

/// Test: A malformed feed is a decode error and is fetched only once
#[tokio::test]
async fn test_malformed_feed_is_decode_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let result = stock_client(&server, 3).lookup("HV0823-003").await;

    assert!(matches!(result, Err(FetchError::Decode(_))));

    Ok(())
}

/// Test: Active products are written to the snapshot file
#[tokio::test]
async fn test_snapshot_written_for_active_products() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_document()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir()?;
    let snapshot_path = dir.path().join("snkrs_data.json");

    stock_client(&server, 1)
        .with_snapshot_path(snapshot_path.clone())
        .lookup("FZ0000-100")
        .await?;

    let written: Value = serde_json::from_slice(&std::fs::read(&snapshot_path)?)?;
    let entries = written.as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["launchView"]["method"], "RAFFLE");
    assert_eq!(entries[1]["launchView"]["startEntryDate"], "2025-03-01T15:00:00Z");
    assert_eq!(entries[1]["availableGtins"][0]["gtin"], "00195866001");

    Ok(())
}
