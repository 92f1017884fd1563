//! Batch pipeline: adapt, validate, de-duplicate and enrich one source's items.
//!
//! A bad item never aborts the batch. Rejections and validation failures are
//! collected next to the good records, and an unreachable source yields an
//! empty batch flagged with the reason.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use pricewatch_core::{
    AlertLevel, AlertThresholds, FieldIssue, FieldProblem, ProductRecord, ValidationError,
};
use thiserror::Error;

use crate::adapter::{Adapted, RawItem, SourceAdapter, SourceRejection};
use crate::error::IngestError;

/// Batch-level failure: the source could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source {source_name} unavailable: {reason}")]
pub struct UpstreamUnavailable {
    pub source_name: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Enriched records in input order.
    pub records: Vec<ProductRecord>,
    pub failures: Vec<ValidationError>,
    pub rejections: Vec<SourceRejection>,
    pub upstream_unavailable: Option<UpstreamUnavailable>,
}

impl BatchOutcome {
    #[must_use]
    pub fn unavailable(source_name: &str, reason: impl Into<String>) -> Self {
        Self {
            upstream_unavailable: Some(UpstreamUnavailable {
                source_name: source_name.to_owned(),
                reason: reason.into(),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_upstream_unavailable(&self) -> bool {
        self.upstream_unavailable.is_some()
    }
}

/// Adapts, validates and enriches `items`.
///
/// A record whose SKU was already seen in this batch fails validation on
/// `sku`; the first occurrence is kept.
#[must_use]
pub fn build_batch(
    adapter: &SourceAdapter,
    items: &[RawItem],
    thresholds: &AlertThresholds,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    let mut seen = HashSet::new();

    for item in items {
        let raw = match adapter.adapt(item) {
            Adapted::Record(raw) => raw,
            Adapted::Rejected(rejection) => {
                tracing::debug!(source = adapter.name(), %rejection, "skipping item");
                outcome.rejections.push(rejection);
                continue;
            }
        };

        match ProductRecord::from_raw(&raw) {
            Ok(record) if !seen.insert(record.sku().to_owned()) => {
                let err = ValidationError {
                    sku: Some(record.sku().to_owned()),
                    issues: vec![FieldIssue::new("sku", FieldProblem::Duplicate)],
                };
                tracing::warn!(source = adapter.name(), error = %err, "duplicate record dropped");
                outcome.failures.push(err);
            }
            Ok(mut record) => {
                record.enrich(thresholds);
                outcome.records.push(record);
            }
            Err(err) => {
                tracing::warn!(source = adapter.name(), error = %err, "record failed validation");
                outcome.failures.push(err);
            }
        }
    }

    for record in &outcome.records {
        if record.alert_level() != Some(AlertLevel::Stable) {
            tracing::warn!(
                sku = record.sku(),
                product = record.product_name(),
                rank_with_shipping = record.rank_with_shipping(),
                popularity_index = record.popularity_index(),
                price_gap = ?record.price_gap(),
                alert_level = ?record.alert_level(),
                "lost rank on top seller"
            );
        }
    }

    tracing::info!(
        source = adapter.name(),
        items = items.len(),
        records = outcome.records.len(),
        failures = outcome.failures.len(),
        rejections = outcome.rejections.len(),
        "batch built"
    );
    outcome
}

/// Awaits `fetch` for at most `timeout`, then builds the batch.
///
/// A fetch error or timeout yields an empty outcome flagged
/// upstream-unavailable instead of an error.
pub async fn load_batch<F>(
    adapter: &SourceAdapter,
    timeout: Duration,
    fetch: F,
    thresholds: &AlertThresholds,
) -> BatchOutcome
where
    F: Future<Output = Result<Vec<RawItem>, IngestError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(items)) => build_batch(adapter, &items, thresholds),
        Ok(Err(err)) => {
            tracing::error!(source = adapter.name(), error = %err, "source fetch failed");
            BatchOutcome::unavailable(adapter.name(), err.to_string())
        }
        Err(_) => {
            tracing::error!(
                source = adapter.name(),
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                "source fetch timed out"
            );
            BatchOutcome::unavailable(
                adapter.name(),
                format!("timed out after {timeout:?}"),
            )
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
