//! Adapter for the store's own product export (spreadsheet rows).

use std::str::FromStr;
use std::sync::Arc;

use pricewatch_core::products::decimal_to_json;
use pricewatch_core::{KnownBrands, RawRecord};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::adapter::{Adapted, RawItem, SourceRejection};
use crate::market::MarketDataSource;
use crate::types::columns;

const CURRENCY_MARKERS: &[&str] = &["EUR", "€", "$", "£"];

/// Maps export rows to canonical mappings, filling market fields from a
/// [`MarketDataSource`].
#[derive(Debug, Clone)]
pub struct TabularAdapter {
    brands: KnownBrands,
    placeholder_image: String,
    market: Arc<dyn MarketDataSource>,
}

impl TabularAdapter {
    #[must_use]
    pub fn new(
        brands: KnownBrands,
        placeholder_image: impl Into<String>,
        market: Arc<dyn MarketDataSource>,
    ) -> Self {
        Self {
            brands,
            placeholder_image: placeholder_image.into(),
            market,
        }
    }

    #[must_use]
    pub fn adapt(&self, item: &RawItem) -> Adapted {
        let sku = cell_text(item, columns::SKU);
        let sku_label = sku.clone().unwrap_or_else(|| "<unknown>".to_owned());

        let raw_price = cell_text(item, columns::REGULAR_PRICE).unwrap_or_default();
        let Some(my_price) = parse_price(&raw_price) else {
            return Adapted::Rejected(SourceRejection::UnparsableNumber {
                sku: sku_label,
                column: columns::REGULAR_PRICE,
                raw: raw_price,
            });
        };
        if my_price <= Decimal::ZERO {
            return Adapted::Rejected(SourceRejection::NonPositivePrice {
                sku: sku_label,
                raw: raw_price,
            });
        }

        let shipping_cost = match cell_text(item, columns::SHIPPING_COST) {
            None => Decimal::ZERO,
            Some(raw) => match parse_price(&raw) {
                Some(amount) => amount,
                None => {
                    return Adapted::Rejected(SourceRejection::UnparsableNumber {
                        sku: sku_label,
                        column: columns::SHIPPING_COST,
                        raw,
                    })
                }
            },
        };

        let Some(my_total) = my_price.checked_add(shipping_cost) else {
            return Adapted::Rejected(SourceRejection::TotalOutOfRange {
                sku: sku_label,
                price: my_price.to_string(),
                shipping: shipping_cost.to_string(),
            });
        };

        let name = cell_text(item, columns::NAME);
        let mut out = RawRecord::new();

        if let Some(sku) = &sku {
            out.insert("sku".to_owned(), Value::String(sku.clone()));
        }
        let brand = cell_text(item, columns::BRANDS)
            .and_then(|brands| first_entry(&brands))
            .or_else(|| {
                name.as_deref()
                    .and_then(|n| self.brands.extract_from_name(n))
            });
        if let Some(brand) = brand {
            out.insert("brand".to_owned(), Value::String(brand));
        }
        if item.contains_key(columns::CATEGORIES) {
            let category = cell_text(item, columns::CATEGORIES)
                .and_then(|c| first_entry(&c))
                .unwrap_or_default();
            out.insert("category".to_owned(), Value::String(category));
        }
        if let Some(name) = name {
            out.insert("product_name".to_owned(), Value::String(name));
        }
        let image_url = cell_text(item, columns::IMAGES)
            .and_then(|images| first_entry(&images))
            .unwrap_or_else(|| self.placeholder_image.clone());
        out.insert("image_url".to_owned(), Value::String(image_url));

        out.insert("my_price".to_owned(), decimal_to_json(my_price));
        out.insert("shipping_cost".to_owned(), decimal_to_json(shipping_cost));

        self.market
            .snapshot(&sku_label, my_price, my_total)
            .write_into(&mut out);

        Adapted::Record(out)
    }
}

/// Cell text, trimmed. Blank cells and nulls count as absent.
fn cell_text(item: &RawItem, column: &str) -> Option<String> {
    let text = match item.get(column)? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// First non-blank entry of a comma-separated cell.
fn first_entry(cell: &str) -> Option<String> {
    cell.split(',')
        .map(str::trim)
        .find(|entry| !entry.is_empty())
        .map(str::to_owned)
}

/// Parses a spreadsheet price such as `"135,90 €"`, `"€1.234,50"` or
/// `"80.40"`.
///
/// When both `.` and `,` appear, the later one is the decimal separator and
/// the other groups thousands.
pub(crate) fn parse_price(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim().to_owned();
    for marker in CURRENCY_MARKERS {
        text = text.replace(marker, "");
    }
    let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if text.is_empty() {
        return None;
    }

    let normalized = match (text.rfind('.'), text.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => text.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => text.replace(',', ""),
        (None, Some(_)) => text.replace(',', "."),
        _ => text,
    };
    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
#[path = "tabular_test.rs"]
mod tests;
