//! Market-side data for sources that only know our own catalogue.
//!
//! The store export carries our prices but nothing about competitors, so the
//! tabular adapter asks a [`MarketDataSource`] for the market fields. The
//! shipped [`SimulatedMarket`] derives them deterministically from the SKU and
//! a seed; tests substitute a fixed implementation.

use std::fmt;

use pricewatch_core::products::decimal_to_json;
use pricewatch_core::RawRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// A competitor offer as seen on the comparison site.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOffer {
    /// Offer total, shipping included.
    pub price: Decimal,
    pub merchant: String,
    pub rating: Option<f64>,
}

/// Market fields for one SKU, in canonical shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub min_price_market: Decimal,
    pub min_price_shipping_market: Decimal,
    pub rank: u32,
    pub rank_with_shipping: u32,
    pub competitors_count: u32,
    pub offers_count: u32,
    pub popularity_index: u32,
    pub best_offers: Vec<MarketOffer>,
}

impl MarketSnapshot {
    /// Writes the snapshot's fields into `raw` under canonical keys.
    pub fn write_into(&self, raw: &mut RawRecord) {
        raw.insert(
            "min_price_market".to_owned(),
            decimal_to_json(self.min_price_market),
        );
        raw.insert(
            "min_price_shipping_market".to_owned(),
            decimal_to_json(self.min_price_shipping_market),
        );
        raw.insert("rank".to_owned(), json!(self.rank));
        raw.insert("rank_with_shipping".to_owned(), json!(self.rank_with_shipping));
        raw.insert("competitors_count".to_owned(), json!(self.competitors_count));
        raw.insert("offers_count".to_owned(), json!(self.offers_count));
        raw.insert("popularity_index".to_owned(), json!(self.popularity_index));

        let offers: Vec<Value> = self
            .best_offers
            .iter()
            .map(|offer| {
                json!({
                    "price": decimal_to_json(offer.price),
                    "merchant": offer.merchant,
                    "rating": offer.rating,
                })
            })
            .collect();
        raw.insert("best_offers".to_owned(), Value::Array(offers));
    }
}

/// Supplies market fields for a SKU given our own price and total.
pub trait MarketDataSource: fmt::Debug + Send + Sync {
    fn snapshot(&self, sku: &str, my_price: Decimal, my_total: Decimal) -> MarketSnapshot;
}

const MERCHANTS: &[&str] = &[
    "ProfumoX",
    "FragranzeTop",
    "ScontiProfumi",
    "Essenze Online",
    "Beauty Outlet",
    "Profumeria Roma",
    "NasoFino",
    "Aroma Store",
    "Parfum Club",
    "Olfatto",
    "Bottega Odori",
    "Nota di Testa",
];

const BEST_OFFERS_SHOWN: usize = 3;

/// Deterministic market stand-in: the same SKU and seed always produce the
/// same snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedMarket {
    seed: u64,
}

struct Competitor {
    price: Decimal,
    total: Decimal,
    merchant: &'static str,
    rating: f64,
}

impl SimulatedMarket {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn rng_for(&self, sku: &str) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(sku.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        StdRng::seed_from_u64(u64::from_le_bytes(bytes))
    }
}

impl MarketDataSource for SimulatedMarket {
    fn snapshot(&self, sku: &str, my_price: Decimal, my_total: Decimal) -> MarketSnapshot {
        let mut rng = self.rng_for(sku);
        let shipping_options = [Decimal::ZERO, Decimal::new(490, 2), Decimal::new(690, 2)];

        let competitors_count: u32 = rng.random_range(2..=12);
        let offers_count = competitors_count + rng.random_range(0..=3);
        let popularity_index: u32 = rng.random_range(1..=100);

        let mut merchants = MERCHANTS.to_vec();
        merchants.shuffle(&mut rng);

        // Competitor prices land within 10% of ours.
        let mut competitors: Vec<Competitor> = merchants
            .into_iter()
            .take(competitors_count as usize)
            .map(|merchant| {
                let factor = Decimal::new(i64::from(rng.random_range(9000u32..=11000)), 4);
                let price = my_price.saturating_mul(factor).round_dp(2);
                let shipping = shipping_options[rng.random_range(0..shipping_options.len())];
                Competitor {
                    price,
                    total: price.saturating_add(shipping),
                    merchant,
                    rating: f64::from(rng.random_range(35u32..=50)) / 10.0,
                }
            })
            .collect();
        competitors.sort_by(|a, b| a.total.cmp(&b.total).then(a.merchant.cmp(b.merchant)));

        let min_price_market = competitors
            .iter()
            .map(|c| c.price)
            .fold(my_price, Decimal::min);
        let min_price_shipping_market = competitors
            .iter()
            .map(|c| c.total)
            .fold(my_total, Decimal::min);

        let cheaper_on_price = competitors.iter().filter(|c| c.price < my_price).count();
        let cheaper_on_total = competitors.iter().filter(|c| c.total < my_total).count();

        MarketSnapshot {
            min_price_market,
            min_price_shipping_market,
            rank: rank_from(cheaper_on_price),
            rank_with_shipping: rank_from(cheaper_on_total),
            competitors_count,
            offers_count,
            popularity_index,
            best_offers: competitors
                .iter()
                .take(BEST_OFFERS_SHOWN)
                .map(|c| MarketOffer {
                    price: c.total,
                    merchant: c.merchant.to_owned(),
                    rating: Some(c.rating),
                })
                .collect(),
        }
    }
}

fn rank_from(cheaper: usize) -> u32 {
    u32::try_from(cheaper).map_or(u32::MAX, |n| n.saturating_add(1))
}
