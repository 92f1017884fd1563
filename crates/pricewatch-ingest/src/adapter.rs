//! Source adapters: one raw upstream item in, one canonical raw mapping out.
//!
//! Adapters never build [`pricewatch_core::ProductRecord`]s themselves. They
//! only rename and reshape fields so that record construction can apply the
//! same validation to every source.

use pricewatch_core::RawRecord;
use thiserror::Error;

use crate::ranking::RankingFeedAdapter;
use crate::tabular::TabularAdapter;

/// One item as delivered by a source, before adaptation.
pub type RawItem = RawRecord;

/// A benign, per-item refusal. Rejected items are skipped, not failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRejection {
    #[error("item {sku}: price {raw:?} is not positive")]
    NonPositivePrice { sku: String, raw: String },

    #[error("item {sku}: column {column:?} value {raw:?} is not a number")]
    UnparsableNumber {
        sku: String,
        column: &'static str,
        raw: String,
    },

    #[error("item {sku}: price {price} plus shipping {shipping} is out of range")]
    TotalOutOfRange {
        sku: String,
        price: String,
        shipping: String,
    },
}

impl SourceRejection {
    #[must_use]
    pub fn sku(&self) -> &str {
        match self {
            Self::NonPositivePrice { sku, .. }
            | Self::UnparsableNumber { sku, .. }
            | Self::TotalOutOfRange { sku, .. } => sku,
        }
    }
}

/// Result of adapting a single item.
#[derive(Debug, Clone, PartialEq)]
pub enum Adapted {
    Record(RawRecord),
    Rejected(SourceRejection),
}

/// The closed set of source adapters. Callers pick one per data source.
#[derive(Debug)]
pub enum SourceAdapter {
    RankingFeed(RankingFeedAdapter),
    Tabular(TabularAdapter),
}

impl SourceAdapter {
    #[must_use]
    pub fn adapt(&self, item: &RawItem) -> Adapted {
        match self {
            Self::RankingFeed(adapter) => Adapted::Record(adapter.adapt(item)),
            Self::Tabular(adapter) => adapter.adapt(item),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RankingFeed(_) => "ranking",
            Self::Tabular(_) => "export",
        }
    }
}
