use serde::Serialize;

/// One product's availability, normalized from the upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockRecord {
    pub title: String,
    pub sku: String,
    pub release_channels: Vec<String>,
    /// Kept in the order the upstream listed the sizes.
    pub size_stock: Vec<SizeStock>,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeStock {
    pub size: String,
    pub level: i64,
}

impl SizeStock {
    pub fn new(size: &str, level: i64) -> Self {
        Self {
            size: size.to_string(),
            level,
        }
    }
}
