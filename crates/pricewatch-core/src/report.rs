use rust_decimal::Decimal;
use serde::Serialize;

use crate::products::{AlertLevel, ProductRecord};

/// One flat export row per enriched record.
///
/// Number formatting (decimal separator, fixed scale) belongs to the writer,
/// so amounts stay as [`Decimal`] here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub sku: String,
    pub product_name: String,
    pub category: String,
    pub my_total_cost: Decimal,
    pub market_min_total_cost: Decimal,
    /// `None` only when the record was never enriched.
    pub price_gap: Option<Decimal>,
    pub rank_with_shipping: u32,
    pub is_winning: bool,
    pub popularity_index: u32,
    pub alert_level: Option<AlertLevel>,
}

impl From<&ProductRecord> for ReportRow {
    fn from(record: &ProductRecord) -> Self {
        Self {
            sku: record.sku().to_string(),
            product_name: record.product_name().to_string(),
            category: record.category().to_string(),
            my_total_cost: record.total_cost(),
            market_min_total_cost: record.min_price_shipping_market(),
            price_gap: record.price_gap(),
            rank_with_shipping: record.rank_with_shipping(),
            is_winning: record.is_winning(),
            popularity_index: record.popularity_index(),
            alert_level: record.alert_level(),
        }
    }
}

/// Builds export rows in record order.
#[must_use]
pub fn report_rows(records: &[ProductRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}
