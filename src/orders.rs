//! Order history summaries.

use crate::client::OrderSource;
use crate::error::FeedError;
use crate::models::{parse_timestamp, OrderRecord, PropertyValue};
use serde::Serialize;
use tracing::info;

const NOT_AVAILABLE: &str = "N/A";

/// Display date format for order dates.
pub const ORDER_DATE_FORMAT: &str = "%b %d, %Y";

/// The five fields shown for each past order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub product_name: String,
    pub variant_name: String,
    pub quantity: String,
    pub value: String,
    pub date: String,
}

impl OrderSummary {
    pub fn from_order(order: &OrderRecord) -> Self {
        let field = |key: &str| -> String {
            order
                .event_properties
                .get(key)
                .filter(|v| v.is_truthy())
                .map(PropertyValue::to_string)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let currency = order
            .event_properties
            .get("$currency_code")
            .filter(|v| v.is_truthy());
        let amount = order.event_properties.get("$value").filter(|v| v.is_truthy());
        let value = match (currency, amount) {
            (Some(currency), Some(amount)) => format!("{} {}", currency, amount),
            _ => NOT_AVAILABLE.to_string(),
        };

        Self {
            product_name: field("Items"),
            variant_name: field("Variant Name"),
            quantity: field("Item Count"),
            value,
            date: format_order_date(order.event_datetime.as_deref()),
        }
    }
}

/// Format an order timestamp; unparseable input is shown as-is.
fn format_order_date(raw: Option<&str>) -> String {
    match raw {
        None | Some("") => NOT_AVAILABLE.to_string(),
        Some(raw) => parse_timestamp(raw)
            .map(|ts| ts.format(ORDER_DATE_FORMAT).to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// Fetch and summarize a subject's order history.
pub async fn load_order_history<S: OrderSource + ?Sized>(
    source: &S,
    subject_id: &str,
) -> Result<Vec<OrderSummary>, FeedError> {
    if subject_id.is_empty() {
        return Err(FeedError::InvalidRequest {
            message: "subject id must not be empty".to_string(),
        });
    }

    let orders = source.fetch_order_history(subject_id).await?;
    info!("Loaded {} orders for {}", orders.len(), subject_id);

    Ok(orders.iter().map(OrderSummary::from_order).collect())
}
