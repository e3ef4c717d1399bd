use anyhow::{Error, Result, anyhow};
use tracing::{debug, error, info, warn};

use crate::{
    clients::{
        delay::Delay,
        stock::{StockClient, StockLookup},
        webhook::WebhookDispatcher,
    },
    formatter::MessageFormatter,
    models::{
        dispatch::DispatchOutcome,
        retry::{RetryConfig, Transient},
        status::RunOutcome,
    },
};

/// One poll of the feed: look the product up, format it and hand it to the webhook.
pub async fn process_drop<S: Delay, D: Delay>(
    sku: &str,
    stock_client: &StockClient<S>,
    formatter: &MessageFormatter,
    dispatcher: &WebhookDispatcher<D>,
) -> Result<RunOutcome, Error> {
    info!(sku, "Checking product feed");

    let record = match stock_client.lookup(sku).await {
        Ok(StockLookup::Found(record)) => record,
        Ok(StockLookup::ProductNotLoaded) => {
            info!(sku, "Product not loaded, nothing to send");
            return Ok(RunOutcome::NothingToDispatch);
        }
        Err(e) => return Err(anyhow!("Unable to fetch stock for {}: {}", sku, e)),
    };

    let payload = formatter.format(&record);
    let outcome = dispatcher.send(&payload).await;

    match &outcome {
        DispatchOutcome::Failed(e) => {
            error!(sku, error = %e, "Stock notification failed")
        }
        _ => info!(sku, outcome = %outcome, "Stock notification sent"),
    }

    Ok(RunOutcome::Dispatched(outcome))
}

/// Runs `operation` until it succeeds, fails permanently, or runs out of attempts.
///
/// Only [`Transient`] errors are retried; each retry waits through `delay`.
pub async fn retry_with_backoff<F, Fut, T, E, D>(
    config: &RetryConfig,
    delay: &D,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + Transient,
    D: Delay,
{
    let mut attempt = 1;

    loop {
        let e = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempt, "Feed fetch recovered after retrying");
                }
                return Ok(result);
            }
            Err(e) => e,
        };

        if !e.is_transient() {
            warn!(attempt, error = %e, "Permanent failure, not retrying");
            return Err(e);
        }

        if attempt >= config.max_attempts {
            warn!(
                max_attempts = config.max_attempts,
                error = %e,
                "Giving up after exhausting all attempts"
            );
            return Err(e);
        }

        let backoff = config.backoff(attempt);
        debug!(
            attempt,
            backoff_ms = backoff.as_millis() as u64,
            error = %e,
            "Transient failure, backing off"
        );
        delay.wait(backoff).await;
        attempt += 1;
    }
}
