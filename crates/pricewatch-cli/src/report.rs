//! Terminal rendering of an enriched batch.

use pricewatch_core::ProductRecord;
use pricewatch_ingest::BatchOutcome;
use rust_decimal::Decimal;

const NAME_WIDTH: usize = 36;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

fn fmt_gap(gap: Option<Decimal>) -> String {
    gap.map_or_else(|| "-".to_string(), |g| format!("{g:+.2}"))
}

/// Prints upstream, validation and rejection problems to stderr.
pub(crate) fn print_problems(outcome: &BatchOutcome) {
    if let Some(unavailable) = &outcome.upstream_unavailable {
        eprintln!("warning: {unavailable}; showing an empty batch");
    }
    for failure in &outcome.failures {
        eprintln!("invalid: {failure}");
    }
    if !outcome.rejections.is_empty() {
        eprintln!("skipped {} rows:", outcome.rejections.len());
        for rejection in &outcome.rejections {
            eprintln!("  {rejection}");
        }
    }
}

pub(crate) fn print_table(outcome: &BatchOutcome) {
    print_problems(outcome);

    if outcome.records.is_empty() {
        println!("no records to report");
        return;
    }

    println!(
        "{:<12}{:<38}{:>10}{:>12}{:>9}{:>6}{:>5}{:>6}  ALERT",
        "SKU", "PRODUCT", "TOTAL", "MARKET MIN", "GAP", "RANK", "WIN", "POP"
    );
    for record in &outcome.records {
        print_record(record);
    }

    let alerts = outcome
        .records
        .iter()
        .filter(|r| r.alert_level().is_some_and(|a| a != pricewatch_core::AlertLevel::Stable))
        .count();
    println!();
    println!(
        "{} records, {} need attention, {} invalid, {} skipped",
        outcome.records.len(),
        alerts,
        outcome.failures.len(),
        outcome.rejections.len()
    );
}

fn print_record(record: &ProductRecord) {
    let alert = record
        .alert_level()
        .map_or_else(|| "-".to_string(), |a| a.to_string());
    println!(
        "{:<12}{:<38}{:>10.2}{:>12.2}{:>9}{:>6}{:>5}{:>6}  {}",
        record.sku(),
        truncate(record.product_name(), NAME_WIDTH),
        record.total_cost(),
        record.min_price_shipping_market(),
        fmt_gap(record.price_gap()),
        record.rank_with_shipping(),
        if record.is_winning() { "yes" } else { "no" },
        record.popularity_index(),
        alert
    );
    for offer in record.best_offers() {
        let diff = offer
            .diff_pct(record.total_cost())
            .map_or_else(|| "n/a".to_string(), |d| format!("{d:+}%"));
        println!(
            "{:<12}  {:<36}{:>10.2}  {}",
            "",
            truncate(offer.merchant(), NAME_WIDTH),
            offer.price(),
            diff
        );
    }
}

/// Prints the batch as one JSON document on stdout.
pub(crate) fn print_json(outcome: &BatchOutcome) -> anyhow::Result<()> {
    let failures: Vec<String> = outcome.failures.iter().map(ToString::to_string).collect();
    let rejections: Vec<String> = outcome.rejections.iter().map(ToString::to_string).collect();
    let document = serde_json::json!({
        "records": outcome.records,
        "failures": failures,
        "rejections": rejections,
        "upstream_unavailable": outcome
            .upstream_unavailable
            .as_ref()
            .map(ToString::to_string),
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_names() {
        assert_eq!(truncate("Dior Sauvage", 36), "Dior Sauvage");
    }

    #[test]
    fn truncate_shortens_long_names() {
        let long = "Acqua di Parma Fico di Amalfi Eau de Toilette 75ml";
        let shown = truncate(long, 20);
        assert_eq!(shown.chars().count(), 20);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn gap_is_signed_with_two_places() {
        assert_eq!(fmt_gap(Some(Decimal::new(100, 2))), "+1.00");
        assert_eq!(fmt_gap(Some(Decimal::new(-499, 2))), "-4.99");
        assert_eq!(fmt_gap(None), "-");
    }
}
