//! Built-in ranking feed sample, used by `--source sample` and by tests.

use serde_json::{json, Value};

use crate::adapter::RawItem;

/// Three items in the comparison site's `OffersRanking` shape.
#[must_use]
pub fn sample_ranking_feed() -> Vec<RawItem> {
    let feed = json!([
        {
            "Sku": "SKU1001A",
            "Category": "Profumi Donna",
            "Product": "Chanel Coco Mademoiselle EdP 100ml",
            "Price": 135.90,
            "ShippingCost": 0.0,
            "TotalCost": 135.90,
            "MinPrice": 134.90,
            "MinPriceWithShippingCost": 134.90,
            "Rank": 2,
            "RankWithShippingCost": 2,
            "NbMerchants": 5,
            "NbOffers": 5,
            "Popularity": 1,
            "BestOffers": [
                {"Price": 134.90, "Merchant": "ProfumoX", "Rating": 4.5},
                {"Price": 135.90, "Merchant": "Noi", "Rating": 4.8}
            ]
        },
        {
            "Sku": "SKU1002B",
            "Category": "Profumi Uomo",
            "Product": "Dior Sauvage EdT 60ml",
            "Price": 75.50,
            "ShippingCost": 4.90,
            "TotalCost": 80.40,
            "MinPrice": 75.50,
            "MinPriceWithShippingCost": 80.40,
            "Rank": 1,
            "RankWithShippingCost": 1,
            "NbMerchants": 3,
            "NbOffers": 3,
            "Popularity": 5,
            "BestOffers": [
                {"Price": 75.50, "Merchant": "Noi", "Rating": 4.8}
            ]
        },
        {
            "Sku": "SKU1003C",
            "Category": "Profumi Nicchia",
            "Product": "Acqua di Parma Fico di Amalfi 75ml",
            "Price": 89.99,
            "ShippingCost": 0.0,
            "TotalCost": 89.99,
            "MinPrice": 85.00,
            "MinPriceWithShippingCost": 85.00,
            "Rank": 7,
            "RankWithShippingCost": 7,
            "NbMerchants": 12,
            "NbOffers": 15,
            "Popularity": 55,
            "BestOffers": [
                {"Price": 85.00, "Merchant": "FragranzeTop", "Rating": 4.9},
                {"Price": 86.50, "Merchant": "ScontiProfumi", "Rating": 4.2}
            ]
        }
    ]);

    match feed {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
