//! Reads the store's product export CSV into raw items for the tabular adapter.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;

use crate::adapter::RawItem;
use crate::error::IngestError;

/// Parses export CSV text. The delimiter (`;` or `,`) is sniffed from the
/// header line; blank cells are left out of the item.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the text is not valid CSV.
pub fn parse_export_csv(text: &str) -> Result<Vec<RawItem>, IngestError> {
    let text = text.trim_start_matches('\u{feff}');
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = if header_line.matches(';').count() > header_line.matches(',').count() {
        b';'
    } else {
        b','
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut items = Vec::new();

    for row in reader.records() {
        let row = row?;
        let item: RawItem = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(header, cell)| (header.to_owned(), Value::String(cell.to_owned())))
            .collect();
        if !item.is_empty() {
            items.push(item);
        }
    }

    tracing::debug!(rows = items.len(), delimiter = %char::from(delimiter), "parsed export CSV");
    Ok(items)
}

/// Reads and parses an export file without blocking the runtime.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be read, or
/// [`IngestError::Csv`] if it is not valid CSV.
pub async fn read_export_file(path: &Path) -> Result<Vec<RawItem>, IngestError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_export_csv(&text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_semicolon_export_with_comma_decimals() {
        let text = "\u{feff}SKU;Name;Regular price;Shipping cost\n\
                    SKU1;Dior Sauvage EdT 60ml;75,50;4,90\n\
                    SKU2;Chanel N5;135,90;\n";

        let items = parse_export_csv(text).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("SKU"), Some(&json!("SKU1")));
        assert_eq!(items[0].get("Regular price"), Some(&json!("75,50")));
        assert!(items[1].get("Shipping cost").is_none());
    }

    #[test]
    fn parses_comma_export_with_quoted_lists() {
        let text = "SKU,Name,Categories,Regular price\n\
                    SKU1,Dior Sauvage,\"Profumi Uomo, Novità\",\"75,50\"\n";

        let items = parse_export_csv(text).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("Categories"), Some(&json!("Profumi Uomo, Novità")));
        assert_eq!(items[0].get("Regular price"), Some(&json!("75,50")));
    }

    #[test]
    fn skips_blank_rows_and_tolerates_short_rows() {
        let text = "SKU;Name;Regular price\n;;\nSKU9;Gucci Bloom\n";

        let items = parse_export_csv(text).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("Name"), Some(&json!("Gucci Bloom")));
        assert!(items[0].get("Regular price").is_none());
    }

    #[tokio::test]
    async fn read_export_file_reports_missing_path() {
        let err = read_export_file(Path::new("/nonexistent/export.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
