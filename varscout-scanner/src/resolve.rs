//! Variant resolution for a single listing page.
//!
//! The listing embeds a map of variants in an inline script, where each
//! variant refers to its traits by selection index. The human readable
//! labels for those indices only exist in the MSKU dropdowns rendered in
//! the DOM, so the two sources are joined here.

use crate::error::{Result, ScanError};
use crate::extract::{find_json_objects, find_key};
use crate::result::{VariantListing, VariantRecord};
use indexmap::IndexMap;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Key under which the listing script stores its variants.
pub const VARIANT_MAP_KEY: &str = "itemVariationsMap";

/// Dropdowns holding the trait options.
pub const TRAIT_SELECT_SELECTOR: &str = ".x-msku__box-cont select";

/// Attribute of a trait dropdown carrying the trait name.
pub const TRAIT_NAME_ATTR: &str = "selectboxlabel";

/// Option value meaning "nothing selected".
pub const UNSELECTED_INDEX: i64 = -1;

const OUT_OF_STOCK_MARKER: &str = "(Out ";

/// Trait name -> (selection index -> display label), read from the DOM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionLabels {
    traits: HashMap<String, HashMap<i64, String>>,
}

impl SelectionLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the labels of every trait dropdown in `document`.
    pub fn from_document(document: &Html) -> Result<Self> {
        let select_selector = parse_selector(TRAIT_SELECT_SELECTOR)?;
        let option_selector = parse_selector("option")?;
        let mut labels = Self::new();

        for select in document.select(&select_selector) {
            let Some(trait_name) = select.value().attr(TRAIT_NAME_ATTR) else {
                debug!("Skipping trait dropdown without a {} attribute", TRAIT_NAME_ATTR);
                continue;
            };

            for option in select.select(&option_selector) {
                let Some(raw_value) = option.value().attr("value") else {
                    continue;
                };
                let Ok(index) = raw_value.trim().parse::<i64>() else {
                    debug!("Skipping option '{}' of trait '{}'", raw_value, trait_name);
                    continue;
                };
                let text: String = option.text().collect();
                labels.insert(trait_name, index, clean_option_label(&text));
            }
        }

        Ok(labels)
    }

    /// Record a label. The unselected sentinel is ignored.
    pub fn insert(&mut self, trait_name: &str, index: i64, label: impl Into<String>) {
        if index == UNSELECTED_INDEX {
            return;
        }
        self.traits
            .entry(trait_name.to_string())
            .or_default()
            .insert(index, label.into());
    }

    pub fn label(&self, trait_name: &str, index: i64) -> Option<&str> {
        self.traits
            .get(trait_name)
            .and_then(|options| options.get(&index))
            .map(String::as_str)
    }

    pub fn contains_trait(&self, trait_name: &str) -> bool {
        self.traits.contains_key(trait_name)
    }

    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }
}

/// Strip the stock annotation from an option label.
///
/// `"Red (Out of stock)"` becomes `"Red"`.
pub fn clean_option_label(text: &str) -> String {
    let label = match text.split_once(OUT_OF_STOCK_MARKER) {
        Some((before, _)) => before,
        None => text,
    };
    label.trim().to_string()
}

/// One entry of the embedded variant map, before trait resolution.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantEntry {
    #[serde(default)]
    price: Value,
    #[serde(default)]
    converted_price: Value,
    #[serde(default)]
    vat_price: Value,
    #[serde(default)]
    quantity: Value,
    #[serde(default)]
    in_stock: Value,
    #[serde(default)]
    quantity_sold: Value,
    #[serde(default)]
    quantity_available: Value,
    #[serde(default)]
    watch_count: Value,
    #[serde(default)]
    epid: Value,
    #[serde(default)]
    top_product: Value,
    trait_values_map: IndexMap<String, i64>,
}

/// Parse `html` and resolve its variants.
pub fn resolve_page(html: &str) -> Result<VariantListing> {
    let document = Html::parse_document(html);
    resolve_variants(&document)
}

/// Build the label -> variant mapping for a listing page.
///
/// A page without the variant script, or whose script holds no decodable
/// variant map, resolves to an empty mapping. A variant whose traits cannot
/// be matched to a dropdown label fails the whole page.
pub fn resolve_variants(document: &Html) -> Result<VariantListing> {
    let Some(script) = find_variant_script(document)? else {
        debug!("No script mentions {}", VARIANT_MAP_KEY);
        return Ok(VariantListing::new());
    };

    let Some(variants) = find_variant_map(&script) else {
        debug!("Variant script holds no decodable {}", VARIANT_MAP_KEY);
        return Ok(VariantListing::new());
    };

    let labels = SelectionLabels::from_document(document)?;
    build_listing(&variants, &labels)
}

/// Text of the first inline script that mentions the variant map.
fn find_variant_script(document: &Html) -> Result<Option<String>> {
    let script_selector = parse_selector("script")?;

    Ok(document
        .select(&script_selector)
        .map(|script| script.text().collect::<String>())
        .find(|text| text.contains(VARIANT_MAP_KEY)))
}

/// Variant map held by the first embedded object that carries the key.
///
/// Returns `None` if no object carries it or if its value is not an object.
pub fn find_variant_map(script_text: &str) -> Option<Map<String, Value>> {
    let holder = find_json_objects(script_text)
        .find(|value| find_key(value, VARIANT_MAP_KEY).is_some())?;

    match find_key(&holder, VARIANT_MAP_KEY) {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(other) => {
            warn!("{} is not an object: {}", VARIANT_MAP_KEY, other);
            None
        }
        None => None,
    }
}

/// Resolve every entry of `variants` against `labels`.
pub fn build_listing(
    variants: &Map<String, Value>,
    labels: &SelectionLabels,
) -> Result<VariantListing> {
    let mut listing = VariantListing::new();

    for (variant_id, entry) in variants {
        let record = resolve_variant(variant_id, entry, labels)?;
        let label = record.label();

        if let Some(replaced) = listing.insert(label.clone(), record) {
            debug!(
                "Variant {} replaces variant {} under label '{}'",
                variant_id, replaced.id, label
            );
        }
    }

    Ok(listing)
}

fn resolve_variant(
    variant_id: &str,
    entry: &Value,
    labels: &SelectionLabels,
) -> Result<VariantRecord> {
    let entry = VariantEntry::deserialize(entry).map_err(|source| ScanError::MalformedVariant {
        variant_id: variant_id.to_string(),
        source,
    })?;

    let mut traits = IndexMap::with_capacity(entry.trait_values_map.len());
    for (trait_name, index) in entry.trait_values_map {
        let Some(label) = labels.label(&trait_name, index) else {
            return Err(ScanError::TraitLookup {
                variant_id: variant_id.to_string(),
                trait_name,
                index,
            });
        };
        traits.insert(trait_name, label.to_string());
    }

    Ok(VariantRecord {
        id: variant_id.to_string(),
        price: entry.price,
        price_converted: entry.converted_price,
        vat_price: entry.vat_price,
        quantity: entry.quantity,
        in_stock: entry.in_stock,
        sold: entry.quantity_sold,
        available: entry.quantity_available,
        watch_count: entry.watch_count,
        epid: entry.epid,
        top_product: entry.top_product,
        traits,
    })
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| ScanError::SelectorError(selector.to_string()))
}
