use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::models::stock::{SizeStock, StockRecord};

/// Top-level document returned by the product feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub objects: Vec<FeedObject>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedObject {
    #[serde(default)]
    pub product_info: Option<Vec<ProductInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub availability: Option<Availability>,
    pub merch_product: Option<MerchProduct>,
    pub product_content: Option<ProductContent>,
    pub image_urls: Option<ImageUrls>,
    pub launch_view: Option<LaunchView>,
    #[serde(default)]
    pub available_gtins: Vec<AvailableGtin>,
    #[serde(default)]
    pub skus: Vec<ProductSku>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchProduct {
    pub status: Option<String>,
    pub style_color: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductContent {
    pub title: Option<String>,
    pub full_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUrls {
    pub product_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchView {
    pub method: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableGtin {
    pub gtin: String,
    #[serde(default)]
    pub level: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSku {
    pub gtin: String,
    pub nike_size: Option<String>,
}

/// Entry written to the on-disk snapshot of active products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub launch_view: Option<LaunchView>,
    pub available_gtins: Vec<AvailableGtin>,
}

impl FeedDocument {
    pub fn products(&self) -> impl Iterator<Item = &ProductInfo> {
        self.objects
            .iter()
            .filter_map(|object| object.product_info.as_ref())
            .flatten()
    }

    pub fn active_products(&self) -> impl Iterator<Item = &ProductInfo> {
        self.products().filter(|product| product.is_active())
    }

    pub fn find_active(&self, sku: &str) -> Option<&ProductInfo> {
        self.active_products()
            .find(|product| product.style_color() == Some(sku))
    }
}

impl ProductInfo {
    pub fn is_active(&self) -> bool {
        let available = self.availability.as_ref().is_some_and(|a| a.available);
        let active = self
            .merch_product
            .as_ref()
            .and_then(|m| m.status.as_deref())
            == Some("ACTIVE");

        available && active
    }

    pub fn style_color(&self) -> Option<&str> {
        self.merch_product.as_ref()?.style_color.as_deref()
    }

    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            launch_view: self.launch_view.clone(),
            available_gtins: self.available_gtins.clone(),
        }
    }

    pub fn to_stock_record(&self) -> StockRecord {
        let title = self
            .product_content
            .as_ref()
            .and_then(|c| c.full_title.clone().or_else(|| c.title.clone()))
            .unwrap_or_default();

        let release_channels = match self.launch_view.as_ref().and_then(|v| v.method.clone()) {
            Some(method) => vec![method],
            None => self
                .merch_product
                .as_ref()
                .map(|m| m.channels.clone())
                .unwrap_or_default(),
        };

        let size_stock = self
            .available_gtins
            .iter()
            .map(|gtin| SizeStock {
                size: self.size_label(&gtin.gtin),
                level: stock_level(&gtin.level),
            })
            .collect();

        StockRecord {
            title,
            sku: self.style_color().unwrap_or_default().to_string(),
            release_channels,
            size_stock,
            photo_url: self
                .image_urls
                .as_ref()
                .and_then(|i| i.product_image_url.clone())
                .unwrap_or_default(),
        }
    }

    fn size_label(&self, gtin: &str) -> String {
        self.skus
            .iter()
            .find(|sku| sku.gtin == gtin)
            .and_then(|sku| sku.nike_size.as_deref())
            .map(|size| format!("US {}", size))
            .unwrap_or_else(|| gtin.to_string())
    }
}

/// Maps the feed's stock level to a number; unknown levels count as out of stock.
pub fn stock_level(level: &JsonValue) -> i64 {
    match level {
        JsonValue::Number(n) => n.as_i64().unwrap_or(0),
        JsonValue::String(s) => match s.to_ascii_uppercase().as_str() {
            "HIGH" => 3,
            "MEDIUM" => 2,
            "LOW" => 1,
            "OOS" => 0,
            other => other.parse().unwrap_or(0),
        },
        _ => 0,
    }
}
