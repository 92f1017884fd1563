//! Adapter for the comparison site's `OffersRanking` feed.

use pricewatch_core::products::decimal_from_json;
use pricewatch_core::RawRecord;
use serde_json::{Map, Value};

use crate::adapter::RawItem;
use crate::types::{
    RANKING_BEST_OFFERS, RANKING_FIELD_MAP, RANKING_OFFER_FIELD_MAP, RANKING_TOTAL_COST,
};

const MISSING_BRAND: &str = "N/A";

/// Renames the feed's PascalCase keys to canonical keys.
///
/// The feed's `TotalCost` is never forwarded: record construction recomputes
/// it from price and shipping. A disagreeing upstream total is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingFeedAdapter;

impl RankingFeedAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn adapt(&self, item: &RawItem) -> RawRecord {
        let mut out = rename_keys(item, RANKING_FIELD_MAP);

        if is_absent(out.get("brand")) {
            out.insert("brand".to_owned(), Value::String(MISSING_BRAND.to_owned()));
        }
        if is_absent(out.get("image_url")) {
            out.insert("image_url".to_owned(), Value::String(String::new()));
        }

        if let Some(offers) = item.get(RANKING_BEST_OFFERS) {
            out.insert("best_offers".to_owned(), adapt_offers(offers));
        }

        reconcile_total_cost(item);
        out
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn rename_keys(source: &Map<String, Value>, field_map: &[(&str, &str)]) -> RawRecord {
    field_map
        .iter()
        .filter_map(|(vendor, canonical)| {
            source
                .get(*vendor)
                .map(|value| ((*canonical).to_owned(), value.clone()))
        })
        .collect()
}

/// Lists are adapted entry by entry. Anything else is forwarded unchanged so
/// that record validation reports it.
fn adapt_offers(offers: &Value) -> Value {
    match offers {
        Value::Array(entries) => Value::Array(
            entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(fields) => {
                        Value::Object(rename_keys(fields, RANKING_OFFER_FIELD_MAP))
                    }
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn reconcile_total_cost(item: &RawItem) {
    let Some(upstream) = item.get(RANKING_TOTAL_COST).and_then(decimal_from_json) else {
        return;
    };
    let price = item.get("Price").and_then(decimal_from_json);
    let shipping = item.get("ShippingCost").and_then(decimal_from_json);
    let (Some(price), Some(shipping)) = (price, shipping) else {
        return;
    };

    let Some(computed) = price.checked_add(shipping) else {
        return;
    };
    if computed != upstream {
        let sku = item.get("Sku").and_then(Value::as_str).unwrap_or("<unknown>");
        tracing::warn!(
            sku,
            upstream_total = %upstream,
            computed_total = %computed,
            "ranking feed total cost disagrees with price + shipping; using computed value"
        );
    }
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
