//! Wire-level shapes and column names for the upstream sources.

use serde::Deserialize;

/// Response body of `GET {base}/TemporaryToken`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "Token", default)]
    pub token: Option<String>,
}

/// Vendor key → canonical key for the ranking feed's scalar fields.
pub(crate) const RANKING_FIELD_MAP: &[(&str, &str)] = &[
    ("Sku", "sku"),
    ("Brand", "brand"),
    ("Category", "category"),
    ("Product", "product_name"),
    ("ImageUrl", "image_url"),
    ("Price", "my_price"),
    ("ShippingCost", "shipping_cost"),
    ("MinPrice", "min_price_market"),
    ("MinPriceWithShippingCost", "min_price_shipping_market"),
    ("Rank", "rank"),
    ("RankWithShippingCost", "rank_with_shipping"),
    ("NbMerchants", "competitors_count"),
    ("NbOffers", "offers_count"),
    ("Popularity", "popularity_index"),
];

/// Vendor key → canonical key inside each `BestOffers` entry.
pub(crate) const RANKING_OFFER_FIELD_MAP: &[(&str, &str)] = &[
    ("Price", "price"),
    ("Merchant", "merchant"),
    ("Rating", "rating"),
];

pub(crate) const RANKING_BEST_OFFERS: &str = "BestOffers";
pub(crate) const RANKING_TOTAL_COST: &str = "TotalCost";

/// Column headers of the store's product export.
pub mod columns {
    pub const SKU: &str = "SKU";
    pub const NAME: &str = "Name";
    pub const BRANDS: &str = "Brands";
    pub const CATEGORIES: &str = "Categories";
    pub const REGULAR_PRICE: &str = "Regular price";
    pub const SHIPPING_COST: &str = "Shipping cost";
    pub const IMAGES: &str = "Images";
}
