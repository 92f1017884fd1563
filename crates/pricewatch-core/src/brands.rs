use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Brand names recognised when a source row carries no explicit brand.
///
/// Loaded from a YAML file shaped like:
///
/// ```yaml
/// brands:
///   - Acqua di Parma
///   - Chanel
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnownBrands {
    pub brands: Vec<String>,
}

impl KnownBrands {
    #[must_use]
    pub fn new(brands: Vec<String>) -> Self {
        Self { brands }
    }

    /// Extracts a brand from a product name.
    ///
    /// Picks the longest known brand that prefixes `product_name`
    /// (case-insensitive, plain prefix, so `"DiorShow"` yields `"Dior"`) and
    /// returns it with its configured casing. Falls back to the first word of the name, or
    /// `None` for a blank name.
    #[must_use]
    pub fn extract_from_name(&self, product_name: &str) -> Option<String> {
        let name = product_name.trim();
        let lower = name.to_lowercase();

        let matched = self
            .brands
            .iter()
            .filter(|brand| lower.starts_with(&brand.to_lowercase()))
            .max_by_key(|brand| brand.len());

        if let Some(brand) = matched {
            return Some(brand.clone());
        }
        name.split_whitespace().next().map(str::to_string)
    }
}

/// Load and validate the known-brands list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_known_brands(path: &Path) -> Result<KnownBrands, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let known: KnownBrands = serde_yaml::from_str(&content).map_err(ConfigError::BrandsFileParse)?;

    validate_known_brands(&known)?;

    Ok(known)
}

fn validate_known_brands(known: &KnownBrands) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for brand in &known.brands {
        if brand.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !seen.insert(brand.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{brand}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
