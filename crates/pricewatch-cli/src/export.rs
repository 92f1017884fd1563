//! Dated CSV price report for spreadsheet users.
//!
//! Italian-locale spreadsheets expect `;` between fields and `,` as the
//! decimal separator, so amounts are written as text in that form.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use pricewatch_core::ReportRow;
use rust_decimal::Decimal;

const HEADERS: [&str; 9] = [
    "SKU",
    "Product",
    "Category",
    "My total cost",
    "Market min total cost",
    "Price gap",
    "Rank (with shipping)",
    "Winning",
    "Popularity",
];

pub(crate) fn report_file_name(date: NaiveDate) -> String {
    format!("price_report_{}.csv", date.format("%Y-%m-%d"))
}

fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}").replace('.', ",")
}

/// UTF-8 byte order mark; spreadsheet apps need it to detect the encoding.
const BOM: &str = "\u{feff}";

/// Writes `rows` as `;`-delimited CSV with a BOM and a header line.
pub(crate) fn write_report_csv<W: Write>(
    mut writer: W,
    rows: &[ReportRow],
) -> anyhow::Result<()> {
    writer.write_all(BOM.as_bytes())?;
    let mut csv = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(writer);

    csv.write_record(HEADERS)?;
    for row in rows {
        csv.write_record([
            row.sku.clone(),
            row.product_name.clone(),
            row.category.clone(),
            format_amount(row.my_total_cost),
            format_amount(row.market_min_total_cost),
            row.price_gap.map(format_amount).unwrap_or_default(),
            row.rank_with_shipping.to_string(),
            if row.is_winning { "YES" } else { "NO" }.to_string(),
            row.popularity_index.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the report for `date` under `dir`, creating the directory.
///
/// Returns `None` without touching the filesystem when there are no rows.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub(crate) fn export_report(
    dir: &Path,
    rows: &[ReportRow],
    date: NaiveDate,
) -> anyhow::Result<Option<PathBuf>> {
    if rows.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create reports directory {}", dir.display()))?;
    let path = dir.join(report_file_name(date));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_report_csv(file, rows)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "price report written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use pricewatch_core::AlertLevel;

    use super::*;

    fn row() -> ReportRow {
        ReportRow {
            sku: "SKU1001A".to_string(),
            product_name: "Chanel Coco Mademoiselle EdP 100ml".to_string(),
            category: "Profumi Donna".to_string(),
            my_total_cost: Decimal::new(13590, 2),
            market_min_total_cost: Decimal::new(1349, 1),
            price_gap: Some(Decimal::new(100, 2)),
            rank_with_shipping: 2,
            is_winning: false,
            popularity_index: 1,
            alert_level: Some(AlertLevel::Warning),
        }
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(report_file_name(date), "price_report_2026-03-07.csv");
    }

    #[test]
    fn csv_uses_semicolons_and_decimal_commas() {
        let mut buf = Vec::new();
        write_report_csv(&mut buf, &[row()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.trim_start_matches(BOM).lines().collect();

        assert_eq!(
            lines[0],
            "SKU;Product;Category;My total cost;Market min total cost;Price gap;Rank (with shipping);Winning;Popularity"
        );
        assert_eq!(
            lines[1],
            "SKU1001A;Chanel Coco Mademoiselle EdP 100ml;Profumi Donna;135,90;134,90;1,00;2;NO;1"
        );
    }

    #[test]
    fn csv_starts_with_utf8_bom() {
        let mut buf = Vec::new();
        write_report_csv(&mut buf, &[row()]).unwrap();

        assert!(buf.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert!(buf[3..].starts_with(b"SKU;Product;"));
    }

    #[test]
    fn winning_flag_is_yes() {
        let mut winning = row();
        winning.is_winning = true;
        winning.price_gap = None;

        let mut buf = Vec::new();
        write_report_csv(&mut buf, &[winning]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.lines().nth(1).unwrap().ends_with(";;2;YES;1"));
    }

    #[test]
    fn export_report_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let path = export_report(&out, &[row()], date).unwrap().expect("file written");

        assert_eq!(path, out.join("price_report_2026-10-19.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(BOM));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn export_report_skips_empty_batches() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        assert!(export_report(dir.path(), &[], date).unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
