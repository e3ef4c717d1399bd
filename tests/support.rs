use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use reqwest::Client;
use restock_notifier::{
    clients::{delay::Delay, webhook::WebhookDispatcher},
    models::{
        dispatch::DispatchSettings,
        stock::{SizeStock, StockRecord},
    },
};
use serde_json::{Value, json};
use wiremock::{MockServer, Request};

/// Records requested waits instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub fn dispatcher_for(
    server: &MockServer,
    settings: DispatchSettings,
    delay: RecordingDelay,
) -> WebhookDispatcher<RecordingDelay> {
    WebhookDispatcher::with_delay(
        Client::new(),
        &format!("{}/webhook", server.uri()),
        settings,
        delay,
    )
}

/// Pulls the `payload_json` part out of a multipart request body.
pub fn payload_json(request: &Request) -> Value {
    let body = String::from_utf8(request.body.clone()).unwrap();
    let field = body.find("name=\"payload_json\"").unwrap();
    let start = field + body[field..].find("\r\n\r\n").unwrap() + 4;
    let end = start + body[start..].find("\r\n--").unwrap();

    serde_json::from_str(&body[start..end]).unwrap()
}

pub fn air_max_record() -> StockRecord {
    StockRecord {
        title: "Air Max Test".to_string(),
        sku: "HV0823-003".to_string(),
        release_channels: vec!["RAFFLE".to_string()],
        size_stock: vec![SizeStock::new("US 9", 3), SizeStock::new("US 10", 0)],
        photo_url: "https://img/x.png".to_string(),
    }
}

pub fn feed_document() -> Value {
    json!({
        "objects": [
            { "id": "no-product-info" },
            {
                "productInfo": [
                    {
                        "availability": { "available": false },
                        "merchProduct": { "status": "ACTIVE", "styleColor": "HV0823-003" }
                    },
                    {
                        "availability": { "available": true },
                        "merchProduct": { "status": "INACTIVE", "styleColor": "HV0823-003" }
                    }
                ]
            },
            {
                "productInfo": [
                    {
                        "availability": { "available": true },
                        "merchProduct": {
                            "status": "ACTIVE",
                            "styleColor": "DZ5485-612",
                            "channels": ["SNKRS Web"]
                        },
                        "productContent": { "title": "Jordan 1" },
                        "availableGtins": [{ "gtin": "111", "level": "HIGH" }]
                    },
                    {
                        "availability": { "available": true },
                        "merchProduct": {
                            "status": "ACTIVE",
                            "styleColor": "HV0823-003",
                            "channels": ["SNKRS Web", "Nike.com"]
                        },
                        "productContent": { "title": "Air Max", "fullTitle": "Air Max Test" },
                        "imageUrls": { "productImageUrl": "https://img/x.png" },
                        "launchView": { "method": "RAFFLE", "startEntryDate": "2025-03-01T15:00:00Z" },
                        "availableGtins": [
                            { "gtin": "00195866001", "level": "HIGH" },
                            { "gtin": "00195866002", "level": "OOS" }
                        ],
                        "skus": [
                            { "gtin": "00195866002", "nikeSize": "10" },
                            { "gtin": "00195866001", "nikeSize": "9" }
                        ]
                    }
                ]
            }
        ]
    })
}
