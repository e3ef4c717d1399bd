use anyhow::{Error, Result, anyhow};
use restock_notifier::{
    clients::{stock::StockClient, webhook::WebhookDispatcher},
    config::Config,
    formatter::MessageFormatter,
    models::status::RunOutcome,
    utils::process_drop,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load()?;
    init_tracing(config.log_json);

    info!(sku = %config.product_sku, "Restock notifier starting");

    let stock_client = StockClient::new(&config)?;
    let dispatcher = WebhookDispatcher::new(&config)?;
    let formatter = MessageFormatter::default();

    match process_drop(&config.product_sku, &stock_client, &formatter, &dispatcher).await? {
        RunOutcome::Dispatched(outcome) if !outcome.is_delivered() => {
            Err(anyhow!("Failed to deliver notification: {}", outcome))
        }
        outcome => {
            info!(outcome = %outcome, "Run finished");
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
