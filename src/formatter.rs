use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::models::{
    embed::{Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedImage, WebhookPayload},
    stock::StockRecord,
};

pub const NO_STOCK_MESSAGE: &str = "No stock information available";

const EMBED_COLOR: u32 = 5763719;

/// Fixed author and footer details stamped on every embed.
#[derive(Debug, Clone)]
pub struct Branding {
    pub author_name: String,
    pub author_icon_url: String,
    pub author_url: String,
    pub footer_text: String,
    pub footer_icon_url: String,
    pub color: u32,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            author_name: "Restock Monitor".to_string(),
            author_icon_url: "https://static.nike.com/a/images/f_auto/snkrs-app-icon.png"
                .to_string(),
            author_url: "https://www.nike.com/launch".to_string(),
            footer_text: "powered by Casual Solutions".to_string(),
            footer_icon_url:
                "https://pbs.twimg.com/profile_images/1398475007584444418/GRPcs63v_400x400.jpg"
                    .to_string(),
            color: EMBED_COLOR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageFormatter {
    branding: Branding,
}

impl MessageFormatter {
    pub fn new(branding: Branding) -> Self {
        Self { branding }
    }

    pub fn format(&self, record: &StockRecord) -> WebhookPayload {
        self.format_at(record, Utc::now())
    }

    pub fn format_at(&self, record: &StockRecord, now: DateTime<Utc>) -> WebhookPayload {
        debug!(
            sku = %record.sku,
            sizes = record.size_stock.len(),
            "Formatting stock notification"
        );

        let fields = vec![
            EmbedField::new("SKU", record.sku.clone()),
            EmbedField::new("Release Method", record.release_channels.join(", ")),
            EmbedField::new("Stock Loaded", stock_block(record)),
        ];

        WebhookPayload::single(Embed {
            title: record.title.clone(),
            color: self.branding.color,
            author: EmbedAuthor {
                name: self.branding.author_name.clone(),
                icon_url: self.branding.author_icon_url.clone(),
                url: self.branding.author_url.clone(),
            },
            fields,
            image: EmbedImage {
                url: record.photo_url.clone(),
            },
            footer: EmbedFooter {
                text: self.branding.footer_text.clone(),
                icon_url: self.branding.footer_icon_url.clone(),
            },
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

fn stock_block(record: &StockRecord) -> String {
    if record.size_stock.is_empty() {
        return NO_STOCK_MESSAGE.to_string();
    }

    let lines: Vec<String> = record
        .size_stock
        .iter()
        .map(|entry| format!("{}: {}", entry.size, entry.level))
        .collect();

    format!("```\n{}\n```", lines.join("\n"))
}
