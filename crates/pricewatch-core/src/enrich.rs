//! Derived market-position metrics for validated records.
//!
//! The engine is a pure batch transform: it reads only each record's own
//! fields, so the result for a record never depends on its neighbours and
//! running it twice yields the same derived values.

use rust_decimal::Decimal;

use crate::products::{AlertLevel, Enrichment, ProductRecord};

/// Alert classification cutoffs, injected by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertThresholds {
    /// Records with `popularity_index` at or below this value are top sellers
    /// and raise alerts when we lose leadership.
    pub high_priority_popularity_max: u32,
    /// Price gaps strictly above this amount escalate a warning to critical.
    pub critical_gap_threshold: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_priority_popularity_max: 3,
            critical_gap_threshold: Decimal::ONE,
        }
    }
}

impl AlertThresholds {
    /// Classifies a record that may or may not hold rank 1.
    #[must_use]
    pub fn classify(
        &self,
        is_winning: bool,
        popularity_index: u32,
        price_gap: Decimal,
    ) -> AlertLevel {
        if is_winning || popularity_index > self.high_priority_popularity_max {
            AlertLevel::Stable
        } else if price_gap > self.critical_gap_threshold {
            AlertLevel::Critical
        } else {
            AlertLevel::Warning
        }
    }
}

/// Computes the derived fields for a single record.
#[must_use]
pub fn derive(record: &ProductRecord, thresholds: &AlertThresholds) -> Enrichment {
    let is_winning = record.rank_with_shipping() == 1;
    let mut price_gap = (record.total_cost() - record.min_price_shipping_market()).round_dp(2);
    price_gap.rescale(2);
    let alert_level = thresholds.classify(is_winning, record.popularity_index(), price_gap);
    Enrichment {
        price_gap,
        is_winning,
        alert_level,
    }
}

impl ProductRecord {
    /// Overwrites this record's derived fields.
    pub fn enrich(&mut self, thresholds: &AlertThresholds) {
        let enrichment = derive(self, thresholds);
        self.set_enrichment(enrichment);
    }
}

/// Enriches every record in place, preserving order.
pub fn enrich_records(records: &mut [ProductRecord], thresholds: &AlertThresholds) {
    for record in records.iter_mut() {
        record.enrich(thresholds);
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;
