pub mod adapter;
pub mod client;
pub mod error;
pub mod fixtures;
pub mod market;
pub mod pipeline;
pub mod ranking;
mod retry;
pub mod sheet;
pub mod tabular;
pub mod types;

pub use adapter::{Adapted, RawItem, SourceAdapter, SourceRejection};
pub use client::RankingClient;
pub use error::IngestError;
pub use market::{MarketDataSource, MarketOffer, MarketSnapshot, SimulatedMarket};
pub use pipeline::{build_batch, load_batch, BatchOutcome, UpstreamUnavailable};
pub use ranking::RankingFeedAdapter;
pub use sheet::{parse_export_csv, read_export_file};
pub use tabular::TabularAdapter;
