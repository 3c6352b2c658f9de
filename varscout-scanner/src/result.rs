use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Mapping from synthesized variant label to the resolved record.
///
/// A later variant with the same label replaces the earlier one but keeps
/// the position of the first insertion.
pub type VariantListing = IndexMap<String, VariantRecord>;

/// One fetched page, as handed to the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub body: String,
    pub response_time: Duration,
}

impl FetchedPage {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            body: String::new(),
            response_time: Duration::from_secs(0),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// One purchasable configuration of a listing.
///
/// Price and counter fields keep the JSON type the page used for them; a
/// field the page omitted is `Value::Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub id: String,
    pub price: Value,
    pub price_converted: Value,
    pub vat_price: Value,
    pub quantity: Value,
    pub in_stock: Value,
    pub sold: Value,
    pub available: Value,
    pub watch_count: Value,
    pub epid: Value,
    pub top_product: Value,
    pub traits: IndexMap<String, String>,
}

impl VariantRecord {
    /// Resolved trait labels joined by single spaces, in trait order.
    pub fn label(&self) -> String {
        self.traits
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
