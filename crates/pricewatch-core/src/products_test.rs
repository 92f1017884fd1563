use serde_json::json;

use super::*;

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

fn raw(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn valid_raw() -> RawRecord {
    raw(json!({
        "sku": "SKU1001A",
        "brand": "Chanel",
        "category": "Profumi Donna",
        "product_name": "Chanel Coco Mademoiselle EdP 100ml",
        "image_url": "https://cdn.example.com/coco.jpg",
        "my_price": 135.90,
        "shipping_cost": 0.0,
        "min_price_market": 134.90,
        "min_price_shipping_market": 134.90,
        "rank": 2,
        "rank_with_shipping": 2,
        "competitors_count": 5,
        "offers_count": 5,
        "popularity_index": 1,
        "best_offers": [
            {"price": 134.90, "merchant": "ProfumoX", "rating": 4.5},
            {"price": 135.90, "merchant": "Noi", "rating": 4.8}
        ]
    }))
}

#[test]
fn from_raw_builds_record_with_computed_total_cost() {
    let mut input = valid_raw();
    input.insert("my_price".into(), json!(75.50));
    input.insert("shipping_cost".into(), json!(4.90));

    let record = ProductRecord::from_raw(&input).expect("valid record");

    assert_eq!(record.sku(), "SKU1001A");
    assert_eq!(record.total_cost(), dec("80.40"));
    assert_eq!(record.total_cost(), record.my_price() + record.shipping_cost());
    assert!(record.enrichment().is_none());
    assert!(!record.is_winning());
}

#[test]
fn from_raw_ignores_supplied_total_cost() {
    let mut input = valid_raw();
    input.insert("total_cost".into(), json!(999.99));

    let record = ProductRecord::from_raw(&input).expect("valid record");

    assert_eq!(record.total_cost(), dec("135.90"));
}

#[test]
fn from_raw_converts_json_floats_exactly() {
    let record = ProductRecord::from_raw(&valid_raw()).expect("valid record");
    assert_eq!(record.my_price(), dec("135.9"));
    assert_eq!(record.min_price_shipping_market(), dec("134.9"));
}

#[test]
fn from_raw_null_best_offers_becomes_empty() {
    let mut input = valid_raw();
    input.insert("best_offers".into(), Value::Null);
    let record = ProductRecord::from_raw(&input).expect("null offers are not an error");
    assert!(record.best_offers().is_empty());

    input.remove("best_offers");
    let record = ProductRecord::from_raw(&input).expect("absent offers are not an error");
    assert!(record.best_offers().is_empty());
}

#[test]
fn from_raw_preserves_best_offers_order() {
    let mut input = valid_raw();
    input.insert(
        "best_offers".into(),
        json!([
            {"price": 99.0, "merchant": "Expensive"},
            {"price": 10.0, "merchant": "Cheap"},
            {"price": 50.0, "merchant": "Middle"}
        ]),
    );

    let record = ProductRecord::from_raw(&input).expect("valid record");
    let merchants: Vec<&str> = record.best_offers().iter().map(Offer::merchant).collect();

    assert_eq!(merchants, vec!["Expensive", "Cheap", "Middle"]);
    assert!(record.best_offers()[0].rating().is_none());
}

#[test]
fn from_raw_reports_every_offending_field() {
    let mut input = valid_raw();
    input.remove("brand");
    input.insert("my_price".into(), json!("135,90"));
    input.insert("shipping_cost".into(), json!(-1.5));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert_eq!(err.sku.as_deref(), Some("SKU1001A"));
    assert_eq!(err.issues.len(), 3, "issues: {:?}", err.issues);
    assert!(err
        .issues
        .contains(&FieldIssue::new("brand", FieldProblem::Missing)));
    assert!(err.issues.contains(&FieldIssue::new(
        "my_price",
        FieldProblem::WrongType {
            expected: "a number"
        }
    )));
    assert!(err
        .issues
        .contains(&FieldIssue::new("shipping_cost", FieldProblem::Negative)));
}

#[test]
fn from_raw_reports_total_cost_overflow_instead_of_panicking() {
    let mut input = valid_raw();
    input.insert("my_price".into(), json!(7e28));
    input.insert("shipping_cost".into(), json!(7e28));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert_eq!(err.issues.len(), 1, "issues: {:?}", err.issues);
    assert_eq!(err.issues[0].field, "my_price");
    assert!(matches!(err.issues[0].problem, FieldProblem::OutOfRange(_)));
}

#[test]
fn from_raw_rejects_empty_sku() {
    let mut input = valid_raw();
    input.insert("sku".into(), json!("   "));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.issues.contains(&FieldIssue::new("sku", FieldProblem::Empty)));
}

#[test]
fn from_raw_rejects_zero_rank_and_popularity() {
    let mut input = valid_raw();
    input.insert("rank_with_shipping".into(), json!(0));
    input.insert("popularity_index".into(), json!(0));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.has_issue_for("rank_with_shipping"));
    assert!(err.has_issue_for("popularity_index"));
    assert!(!err.has_issue_for("rank"));
}

#[test]
fn from_raw_rejects_fractional_rank() {
    let mut input = valid_raw();
    input.insert("rank".into(), json!(1.5));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.issues.contains(&FieldIssue::new(
        "rank",
        FieldProblem::WrongType {
            expected: "an integer"
        }
    )));
}

#[test]
fn from_raw_rejects_offers_count_below_competitors_count() {
    let mut input = valid_raw();
    input.insert("competitors_count".into(), json!(6));
    input.insert("offers_count".into(), json!(4));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert_eq!(err.issues.len(), 1);
    assert!(err.has_issue_for("offers_count"));
}

#[test]
fn from_raw_reports_indexed_offer_paths() {
    let mut input = valid_raw();
    input.insert(
        "best_offers".into(),
        json!([
            {"price": 10.0, "merchant": "Fine"},
            {"price": -2.0, "merchant": ""},
            {"merchant": "NoPrice", "rating": "great"}
        ]),
    );

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.has_issue_for("best_offers[1].price"));
    assert!(err.has_issue_for("best_offers[1].merchant"));
    assert!(err.has_issue_for("best_offers[2].price"));
    assert!(err.has_issue_for("best_offers[2].rating"));
    assert!(!err.has_issue_for("best_offers[0].price"));
}

#[test]
fn from_raw_rejects_non_list_best_offers() {
    let mut input = valid_raw();
    input.insert("best_offers".into(), json!("ProfumoX"));

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.has_issue_for("best_offers"));
}

#[test]
fn from_raw_missing_sku_error_has_no_sku() {
    let mut input = valid_raw();
    input.remove("sku");

    let err = ProductRecord::from_raw(&input).unwrap_err();

    assert!(err.sku.is_none());
    assert!(err.issues.contains(&FieldIssue::new("sku", FieldProblem::Missing)));
}

#[test]
fn from_raw_optional_image_url() {
    let mut input = valid_raw();
    input.remove("image_url");
    let record = ProductRecord::from_raw(&input).expect("image_url is optional");
    assert!(record.image_url().is_none());

    input.insert("image_url".into(), json!(42));
    let err = ProductRecord::from_raw(&input).unwrap_err();
    assert!(err.has_issue_for("image_url"));
}

#[test]
fn offer_new_rejects_negative_price_and_blank_merchant() {
    let issues = Offer::new(dec("-0.01"), " ", None).unwrap_err();
    assert_eq!(issues.len(), 2);

    let offer = Offer::new(Decimal::ZERO, "Shop", Some(-3.0)).expect("zero price is allowed");
    assert_eq!(offer.rating(), Some(-3.0));
}

#[test]
fn offer_diff_pct_against_reference() {
    let offer = Offer::new(dec("134.90"), "ProfumoX", None).unwrap();
    assert_eq!(offer.diff_pct(dec("135.90")), Some(dec("-0.7")));
    assert_eq!(offer.diff_pct(Decimal::ZERO), None);
}

#[test]
fn offer_diff_pct_is_none_when_not_representable() {
    let offer = Offer::new(dec("70000000000000000000000000000"), "Shop", None).unwrap();
    assert_eq!(offer.diff_pct(Decimal::new(1, 28)), None);
}

#[test]
fn decimal_json_helpers_roundtrip_prices() {
    let amount = dec("135.90");
    let encoded = decimal_to_json(amount);
    assert_eq!(decimal_from_json(&encoded), Some(amount));
    assert_eq!(decimal_from_json(&json!("135.90")), None);
}
