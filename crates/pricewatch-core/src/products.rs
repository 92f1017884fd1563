use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldIssue, FieldProblem, ValidationError};

/// A raw field mapping keyed by canonical field names, as emitted by a
/// source adapter and consumed by [`ProductRecord::from_raw`].
pub type RawRecord = Map<String, Value>;

/// A single competitor price quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    price: Decimal,
    merchant: String,
    rating: Option<f64>,
}

impl Offer {
    /// Builds an offer, rejecting a negative price or a blank merchant.
    ///
    /// # Errors
    ///
    /// Returns every [`FieldIssue`] found, with field names relative to the
    /// offer (`price`, `merchant`).
    pub fn new(
        price: Decimal,
        merchant: impl Into<String>,
        rating: Option<f64>,
    ) -> Result<Self, Vec<FieldIssue>> {
        let merchant = merchant.into();
        let mut issues = Vec::new();
        if price < Decimal::ZERO {
            issues.push(FieldIssue::new("price", FieldProblem::Negative));
        }
        if merchant.trim().is_empty() {
            issues.push(FieldIssue::new("merchant", FieldProblem::Empty));
        }
        if issues.is_empty() {
            Ok(Self {
                price,
                merchant,
                rating,
            })
        } else {
            Err(issues)
        }
    }

    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.rating
    }

    /// Percentage difference of this offer against `reference_total`,
    /// rounded to one decimal place. Negative means the offer is cheaper.
    ///
    /// Returns `None` when the reference is zero or the percentage does not
    /// fit in a `Decimal`.
    #[must_use]
    pub fn diff_pct(&self, reference_total: Decimal) -> Option<Decimal> {
        if reference_total.is_zero() {
            return None;
        }
        let pct = self
            .price
            .checked_sub(reference_total)?
            .checked_div(reference_total)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        Some(pct.round_dp(1))
    }
}

/// Market-position severity assigned by the enrichment engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Stable,
    Warning,
    Critical,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Stable => write!(f, "STABLE"),
            AlertLevel::Warning => write!(f, "WARNING"),
            AlertLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Fields derived by [`crate::enrich`]; absent on a freshly built record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    /// `total_cost - min_price_shipping_market`, rounded to two places.
    /// Positive means we are more expensive than the best market total.
    pub price_gap: Decimal,
    pub is_winning: bool,
    pub alert_level: AlertLevel,
}

/// The canonical product-pricing record every source maps into.
///
/// Fields are private so that `total_cost` can never drift from
/// `my_price + shipping_cost` and derived values can only be written by the
/// enrichment engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    sku: String,
    brand: String,
    category: String,
    product_name: String,
    image_url: Option<String>,
    my_price: Decimal,
    shipping_cost: Decimal,
    total_cost: Decimal,
    min_price_market: Decimal,
    min_price_shipping_market: Decimal,
    /// Position by list price alone, 1-based.
    rank: u32,
    /// Position by total cost, 1-based.
    rank_with_shipping: u32,
    competitors_count: u32,
    offers_count: u32,
    /// Lower means more searched.
    popularity_index: u32,
    best_offers: Vec<Offer>,
    #[serde(flatten)]
    enrichment: Option<Enrichment>,
}

impl ProductRecord {
    /// Validates a raw canonical mapping and builds a record from it.
    ///
    /// `total_cost` is always computed here; any `total_cost` key in `raw` is
    /// ignored. A null or absent `best_offers` becomes an empty list.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every missing, mistyped, negative
    /// or out-of-range field.
    pub fn from_raw(raw: &RawRecord) -> Result<Self, ValidationError> {
        let mut v = FieldReader::new(raw);

        let sku = v.non_empty_string("sku");
        let brand = v.string("brand");
        let category = v.string("category");
        let product_name = v.string("product_name");
        let image_url = v.optional_string("image_url");

        let my_price = v.money("my_price");
        let shipping_cost = v.money("shipping_cost");
        let total_cost = match (my_price, shipping_cost) {
            (Some(price), Some(shipping)) => {
                let total = price.checked_add(shipping);
                if total.is_none() {
                    v.push(
                        "my_price",
                        FieldProblem::OutOfRange("my_price + shipping_cost overflows".to_string()),
                    );
                }
                total
            }
            _ => None,
        };
        let min_price_market = v.money("min_price_market");
        let min_price_shipping_market = v.money("min_price_shipping_market");

        let rank = v.positive_int("rank");
        let rank_with_shipping = v.positive_int("rank_with_shipping");
        let competitors_count = v.count("competitors_count");
        let offers_count = v.count("offers_count");
        let popularity_index = v.positive_int("popularity_index");

        if let (Some(competitors), Some(offers)) = (competitors_count, offers_count) {
            if offers < competitors {
                v.push(
                    "offers_count",
                    FieldProblem::OutOfRange(format!(
                        "must be at least competitors_count ({competitors}), got {offers}"
                    )),
                );
            }
        }

        let best_offers = v.offers("best_offers");

        let sku_for_error = sku.clone().or_else(|| v.sku_hint());
        let fail = |issues| ValidationError {
            sku: sku_for_error.clone(),
            issues,
        };

        let (
            Some(sku),
            Some(brand),
            Some(category),
            Some(product_name),
            Some(my_price),
            Some(shipping_cost),
            Some(total_cost),
            Some(min_price_market),
            Some(min_price_shipping_market),
            Some(rank),
            Some(rank_with_shipping),
            Some(competitors_count),
            Some(offers_count),
            Some(popularity_index),
            Some(best_offers),
        ) = (
            sku,
            brand,
            category,
            product_name,
            my_price,
            shipping_cost,
            total_cost,
            min_price_market,
            min_price_shipping_market,
            rank,
            rank_with_shipping,
            competitors_count,
            offers_count,
            popularity_index,
            best_offers,
        )
        else {
            return Err(fail(v.issues));
        };
        if !v.issues.is_empty() {
            return Err(fail(v.issues));
        }

        Ok(Self {
            sku,
            brand,
            category,
            product_name,
            image_url,
            my_price,
            shipping_cost,
            total_cost,
            min_price_market,
            min_price_shipping_market,
            rank,
            rank_with_shipping,
            competitors_count,
            offers_count,
            popularity_index,
            best_offers,
            enrichment: None,
        })
    }

    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    #[must_use]
    pub fn brand(&self) -> &str {
        &self.brand
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn my_price(&self) -> Decimal {
        self.my_price
    }

    #[must_use]
    pub fn shipping_cost(&self) -> Decimal {
        self.shipping_cost
    }

    /// List price plus shipping; the basis for leadership comparisons.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    #[must_use]
    pub fn min_price_market(&self) -> Decimal {
        self.min_price_market
    }

    #[must_use]
    pub fn min_price_shipping_market(&self) -> Decimal {
        self.min_price_shipping_market
    }

    #[must_use]
    pub fn rank(&self) -> u32 {
        self.rank
    }

    #[must_use]
    pub fn rank_with_shipping(&self) -> u32 {
        self.rank_with_shipping
    }

    #[must_use]
    pub fn competitors_count(&self) -> u32 {
        self.competitors_count
    }

    #[must_use]
    pub fn offers_count(&self) -> u32 {
        self.offers_count
    }

    #[must_use]
    pub fn popularity_index(&self) -> u32 {
        self.popularity_index
    }

    /// Competing quotes in source order. Not guaranteed to be sorted by price.
    #[must_use]
    pub fn best_offers(&self) -> &[Offer] {
        &self.best_offers
    }

    /// Derived metrics, or `None` until the record has been enriched.
    #[must_use]
    pub fn enrichment(&self) -> Option<&Enrichment> {
        self.enrichment.as_ref()
    }

    #[must_use]
    pub fn price_gap(&self) -> Option<Decimal> {
        self.enrichment.as_ref().map(|e| e.price_gap)
    }

    /// `false` until enriched.
    #[must_use]
    pub fn is_winning(&self) -> bool {
        self.enrichment.as_ref().is_some_and(|e| e.is_winning)
    }

    #[must_use]
    pub fn alert_level(&self) -> Option<AlertLevel> {
        self.enrichment.as_ref().map(|e| e.alert_level)
    }

    pub(crate) fn set_enrichment(&mut self, enrichment: Enrichment) {
        self.enrichment = Some(enrichment);
    }
}

/// Reads typed values out of a [`RawRecord`], recording an issue for every
/// field that fails instead of stopping at the first.
struct FieldReader<'a> {
    raw: &'a RawRecord,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(raw: &'a RawRecord) -> Self {
        Self {
            raw,
            issues: Vec::new(),
        }
    }

    fn push(&mut self, field: impl Into<String>, problem: FieldProblem) {
        self.issues.push(FieldIssue::new(field, problem));
    }

    /// Returns the value for `field`, treating JSON `null` as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.raw.get(field).filter(|v| !v.is_null())
    }

    /// Best-effort SKU for error context when the SKU itself is invalid.
    fn sku_hint(&self) -> Option<String> {
        self.get("sku").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn string(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            None => {
                self.push(field, FieldProblem::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(field, FieldProblem::WrongType { expected: "a string" });
                None
            }
        }
    }

    fn non_empty_string(&mut self, field: &str) -> Option<String> {
        let s = self.string(field)?;
        if s.trim().is_empty() {
            self.push(field, FieldProblem::Empty);
            return None;
        }
        Some(s)
    }

    fn optional_string(&mut self, field: &str) -> Option<String> {
        match self.get(field) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(field, FieldProblem::WrongType { expected: "a string" });
                None
            }
        }
    }

    fn money(&mut self, field: &str) -> Option<Decimal> {
        let value = match self.get(field) {
            None => {
                self.push(field, FieldProblem::Missing);
                return None;
            }
            Some(value) => value,
        };
        match decimal_from_json(value) {
            Some(amount) if amount < Decimal::ZERO => {
                self.push(field, FieldProblem::Negative);
                None
            }
            Some(amount) => Some(amount),
            None => {
                self.push(field, FieldProblem::WrongType { expected: "a number" });
                None
            }
        }
    }

    fn int(&mut self, field: &str) -> Option<i64> {
        match self.get(field) {
            None => {
                self.push(field, FieldProblem::Missing);
                None
            }
            Some(value) => {
                let parsed = value.as_i64();
                if parsed.is_none() {
                    self.push(field, FieldProblem::WrongType { expected: "an integer" });
                }
                parsed
            }
        }
    }

    /// A 1-based integer such as a rank or popularity index.
    fn positive_int(&mut self, field: &str) -> Option<u32> {
        let n = self.int(field)?;
        if n < 1 {
            self.push(
                field,
                FieldProblem::OutOfRange(format!("must be at least 1, got {n}")),
            );
            return None;
        }
        self.fit_u32(field, n)
    }

    fn count(&mut self, field: &str) -> Option<u32> {
        let n = self.int(field)?;
        if n < 0 {
            self.push(field, FieldProblem::Negative);
            return None;
        }
        self.fit_u32(field, n)
    }

    fn fit_u32(&mut self, field: &str, n: i64) -> Option<u32> {
        match u32::try_from(n) {
            Ok(n) => Some(n),
            Err(_) => {
                self.push(field, FieldProblem::OutOfRange(format!("{n} is too large")));
                None
            }
        }
    }

    fn offers(&mut self, field: &str) -> Option<Vec<Offer>> {
        let items = match self.get(field) {
            None => return Some(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.push(field, FieldProblem::WrongType { expected: "a list" });
                return None;
            }
        };

        let mut offers = Vec::with_capacity(items.len());
        let mut ok = true;
        for (idx, item) in items.iter().enumerate() {
            let prefix = format!("{field}[{idx}]");
            match self.offer(&prefix, item) {
                Some(offer) => offers.push(offer),
                None => ok = false,
            }
        }
        ok.then_some(offers)
    }

    fn offer(&mut self, prefix: &str, item: &Value) -> Option<Offer> {
        let Value::Object(obj) = item else {
            self.push(prefix, FieldProblem::WrongType { expected: "an object" });
            return None;
        };
        let get = |name: &str| obj.get(name).filter(|v| !v.is_null());
        let before = self.issues.len();

        let price = match get("price") {
            None => {
                self.push(format!("{prefix}.price"), FieldProblem::Missing);
                None
            }
            Some(v) => {
                let price = decimal_from_json(v);
                if price.is_none() {
                    self.push(
                        format!("{prefix}.price"),
                        FieldProblem::WrongType { expected: "a number" },
                    );
                }
                price
            }
        };

        let merchant = match get("merchant") {
            None => {
                self.push(format!("{prefix}.merchant"), FieldProblem::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(
                    format!("{prefix}.merchant"),
                    FieldProblem::WrongType { expected: "a string" },
                );
                None
            }
        };

        let rating = get("rating").and_then(|v| {
            let rating = v.as_f64();
            if rating.is_none() {
                self.push(
                    format!("{prefix}.rating"),
                    FieldProblem::WrongType { expected: "a number" },
                );
            }
            rating
        });

        let (Some(price), Some(merchant)) = (price, merchant) else {
            return None;
        };
        if self.issues.len() > before {
            return None;
        }

        match Offer::new(price, merchant, rating) {
            Ok(offer) => Some(offer),
            Err(offer_issues) => {
                self.issues.extend(
                    offer_issues
                        .into_iter()
                        .map(|i| FieldIssue::new(format!("{prefix}.{}", i.field), i.problem)),
                );
                None
            }
        }
    }
}

/// Converts a JSON number to an exact decimal through its shortest textual
/// form, so `135.9` becomes `135.9` rather than its binary approximation.
/// Strings and other types are not numbers and yield `None`.
#[must_use]
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let Value::Number(n) = value else {
        return None;
    };
    let text = n.to_string();
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
}

/// Encodes a decimal amount as a JSON number. Amounts with more than ~15
/// significant digits lose precision; prices never get close.
#[must_use]
pub fn decimal_to_json(amount: Decimal) -> Value {
    amount.to_f64().map_or(Value::Null, Value::from)
}

#[cfg(test)]
#[path = "products_test.rs"]
mod tests;
