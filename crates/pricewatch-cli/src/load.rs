//! Resolves a `--source` choice into an enriched batch.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use pricewatch_core::{load_known_brands, AppConfig, ConfigError, KnownBrands};
use pricewatch_ingest::fixtures::sample_ranking_feed;
use pricewatch_ingest::{
    build_batch, load_batch, read_export_file, BatchOutcome, RankingClient, RankingFeedAdapter,
    SimulatedMarket, SourceAdapter, TabularAdapter,
};

use crate::SourceKind;

/// Loads the known-brands list. A missing file falls back to an empty list,
/// so brand extraction uses the first word of the product name.
pub(crate) fn known_brands(config: &AppConfig) -> Result<KnownBrands, ConfigError> {
    if !config.brands_path.exists() {
        tracing::warn!(
            path = %config.brands_path.display(),
            "known-brands file not found; falling back to first-word brands"
        );
        return Ok(KnownBrands::default());
    }
    load_known_brands(&config.brands_path)
}

/// Upper bound on a whole remote load: every attempt of both calls.
fn overall_timeout(config: &AppConfig) -> Duration {
    let per_attempt = config
        .token_timeout_secs
        .saturating_add(config.request_timeout_secs);
    Duration::from_secs(per_attempt.saturating_mul(u64::from(config.max_retries) + 1))
}

pub(crate) async fn load_source(
    config: &AppConfig,
    source: SourceKind,
    file: Option<&Path>,
) -> anyhow::Result<BatchOutcome> {
    let thresholds = config.alert_thresholds();

    let outcome = match source {
        SourceKind::Sample => {
            let adapter = SourceAdapter::RankingFeed(RankingFeedAdapter::new());
            build_batch(&adapter, &sample_ranking_feed(), &thresholds)
        }
        SourceKind::Ranking => {
            let client = RankingClient::from_config(config)
                .map_err(|e| anyhow::anyhow!("cannot use ranking source: {e}"))?;
            let adapter = SourceAdapter::RankingFeed(RankingFeedAdapter::new());
            load_batch(
                &adapter,
                overall_timeout(config),
                client.offers_ranking(),
                &thresholds,
            )
            .await
        }
        SourceKind::Export => {
            let path = file.ok_or_else(|| anyhow::anyhow!("--source export requires --file"))?;
            let adapter = SourceAdapter::Tabular(TabularAdapter::new(
                known_brands(config)?,
                config.image_placeholder_url.clone(),
                Arc::new(SimulatedMarket::new(config.market_seed)),
            ));
            load_batch(
                &adapter,
                Duration::from_secs(config.request_timeout_secs),
                read_export_file(path),
                &thresholds,
            )
            .await
        }
    };

    Ok(outcome)
}
