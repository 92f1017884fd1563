pub mod app_config;
pub mod brands;
pub mod config;
pub mod enrich;
pub mod error;
pub mod products;
pub mod report;

pub use app_config::{AppConfig, Environment};
pub use brands::{load_known_brands, KnownBrands};
pub use config::{load_app_config, load_app_config_from_env};
pub use enrich::{enrich_records, AlertThresholds};
pub use error::{ConfigError, FieldIssue, FieldProblem, ValidationError};
pub use products::{AlertLevel, Enrichment, Offer, ProductRecord, RawRecord};
pub use report::{report_rows, ReportRow};
