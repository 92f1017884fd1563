use std::sync::Arc;

use pricewatch_core::KnownBrands;
use serde_json::json;

use super::*;
use crate::fixtures::sample_ranking_feed;
use crate::market::SimulatedMarket;
use crate::ranking::RankingFeedAdapter;
use crate::tabular::TabularAdapter;

fn ranking() -> SourceAdapter {
    SourceAdapter::RankingFeed(RankingFeedAdapter::new())
}

fn with_sku(mut item: RawItem, sku: &str) -> RawItem {
    item.insert("Sku".into(), json!(sku));
    item
}

fn five_items_with_third_invalid() -> Vec<RawItem> {
    let feed = sample_ranking_feed();
    let mut third = with_sku(feed[0].clone(), "SKU9003");
    third.remove("Product");
    third.insert("Price".into(), json!(-5.0));

    vec![
        feed[0].clone(),
        feed[1].clone(),
        third,
        feed[2].clone(),
        with_sku(feed[1].clone(), "SKU9005"),
    ]
}

#[test]
fn one_invalid_item_does_not_abort_the_batch() {
    let outcome = build_batch(
        &ranking(),
        &five_items_with_third_invalid(),
        &AlertThresholds::default(),
    );

    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.rejections.is_empty());
    assert!(!outcome.is_upstream_unavailable());

    let failure = &outcome.failures[0];
    assert_eq!(failure.sku.as_deref(), Some("SKU9003"));
    assert!(failure.has_issue_for("product_name"));
    assert!(failure.has_issue_for("my_price"));

    let skus: Vec<&str> = outcome.records.iter().map(ProductRecord::sku).collect();
    assert_eq!(skus, vec!["SKU1001A", "SKU1002B", "SKU1003C", "SKU9005"]);
    assert!(outcome.records.iter().all(|r| r.enrichment().is_some()));
}

#[test]
fn sample_feed_gets_expected_alert_levels() {
    let outcome = build_batch(&ranking(), &sample_ranking_feed(), &AlertThresholds::default());

    let levels: Vec<Option<AlertLevel>> =
        outcome.records.iter().map(ProductRecord::alert_level).collect();
    assert_eq!(
        levels,
        vec![
            Some(AlertLevel::Warning),
            Some(AlertLevel::Stable),
            Some(AlertLevel::Stable),
        ]
    );
    assert!(outcome.records[1].is_winning());
}

#[test]
fn duplicate_sku_keeps_first_occurrence() {
    let feed = sample_ranking_feed();
    let mut dup = feed[0].clone();
    dup.insert("Price".into(), json!(1.0));
    let items = vec![feed[0].clone(), dup];

    let outcome = build_batch(&ranking(), &items, &AlertThresholds::default());

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].my_price().to_string(), "135.9");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(
        outcome.failures[0].issues,
        vec![FieldIssue::new("sku", FieldProblem::Duplicate)]
    );
}

#[test]
fn tabular_rejections_are_skipped_not_failed() {
    let adapter = SourceAdapter::Tabular(TabularAdapter::new(
        KnownBrands::default(),
        "placeholder.png",
        Arc::new(SimulatedMarket::new(1)),
    ));
    let rows: Vec<RawItem> = [
        json!({"SKU": "A1", "Name": "Gucci Bloom", "Categories": "Donna", "Regular price": "0"}),
        json!({"SKU": "A2", "Name": "Gucci Guilty", "Categories": "Uomo", "Regular price": "abc"}),
        json!({"SKU": "A3", "Name": "Gucci Flora", "Categories": "Donna", "Regular price": "59,90"}),
    ]
    .into_iter()
    .filter_map(|v| match v {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    })
    .collect();

    let outcome = build_batch(&adapter, &rows, &AlertThresholds::default());

    assert_eq!(outcome.rejections.len(), 2);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].sku(), "A3");
    assert_eq!(outcome.records[0].brand(), "Gucci");
}

#[test]
fn empty_input_gives_empty_outcome() {
    let outcome = build_batch(&ranking(), &[], &AlertThresholds::default());
    assert!(outcome.records.is_empty());
    assert!(outcome.failures.is_empty());
    assert!(!outcome.is_upstream_unavailable());
}

#[tokio::test]
async fn load_batch_builds_from_successful_fetch() {
    let outcome = load_batch(
        &ranking(),
        Duration::from_secs(5),
        async { Ok(sample_ranking_feed()) },
        &AlertThresholds::default(),
    )
    .await;

    assert_eq!(outcome.records.len(), 3);
    assert!(!outcome.is_upstream_unavailable());
}

#[tokio::test]
async fn load_batch_flags_fetch_error_as_unavailable() {
    let outcome = load_batch(
        &ranking(),
        Duration::from_secs(5),
        async { Err(IngestError::Auth("empty token".to_owned())) },
        &AlertThresholds::default(),
    )
    .await;

    assert!(outcome.records.is_empty());
    let unavailable = outcome.upstream_unavailable.expect("flagged");
    assert_eq!(unavailable.source_name, "ranking");
    assert!(unavailable.reason.contains("empty token"));
}

#[tokio::test]
async fn load_batch_times_out_instead_of_hanging() {
    let outcome = load_batch(
        &ranking(),
        Duration::from_millis(20),
        std::future::pending::<Result<Vec<RawItem>, IngestError>>(),
        &AlertThresholds::default(),
    )
    .await;

    assert!(outcome.records.is_empty());
    let unavailable = outcome.upstream_unavailable.expect("flagged");
    assert!(unavailable.reason.contains("timed out"));
}

#[tokio::test]
async fn load_batch_flags_slow_fetch_as_unavailable() {
    let slow_fetch = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok(sample_ranking_feed())
    };

    let outcome = load_batch(
        &ranking(),
        Duration::from_millis(20),
        slow_fetch,
        &AlertThresholds::default(),
    )
    .await;

    assert!(outcome.records.is_empty());
    assert!(outcome.is_upstream_unavailable());
}

#[test]
fn overflowing_ranking_item_fails_without_aborting_the_batch() {
    let feed = sample_ranking_feed();
    let mut huge = with_sku(feed[0].clone(), "SKU9999");
    huge.insert("Price".into(), json!(7e28));
    huge.insert("ShippingCost".into(), json!(7e28));
    let items = vec![feed[0].clone(), huge];

    let outcome = build_batch(&ranking(), &items, &AlertThresholds::default());

    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].sku.as_deref(), Some("SKU9999"));
    assert!(outcome.failures[0].has_issue_for("my_price"));
}
