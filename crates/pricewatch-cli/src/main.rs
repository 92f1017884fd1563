mod export;
mod load;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricewatch")]
#[command(about = "Price-position monitoring for a comparison-site merchant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where a batch of items comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SourceKind {
    /// Built-in three-item ranking feed
    Sample,
    /// Live `OffersRanking` API (needs merchant credentials)
    Ranking,
    /// Store product export CSV (needs --file)
    Export,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the enriched batch as a table or JSON
    Report {
        #[arg(long, value_enum, default_value = "sample")]
        source: SourceKind,
        /// Export CSV to read when --source export
        #[arg(long)]
        file: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the dated CSV price report
    Export {
        #[arg(long, value_enum, default_value = "sample")]
        source: SourceKind,
        /// Export CSV to read when --source export
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output directory (defaults to PRICEWATCH_REPORTS_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the resolved configuration with secrets redacted
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = pricewatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Report { source, file, json } => {
            let outcome = load::load_source(&config, source, file.as_deref()).await?;
            if json {
                report::print_json(&outcome)?;
            } else {
                report::print_table(&outcome);
            }
        }
        Commands::Export {
            source,
            file,
            out_dir,
        } => {
            let outcome = load::load_source(&config, source, file.as_deref()).await?;
            report::print_problems(&outcome);
            let dir = out_dir.unwrap_or_else(|| config.reports_dir.clone());
            let rows = pricewatch_core::report_rows(&outcome.records);
            let today = chrono::Local::now().date_naive();
            match export::export_report(&dir, &rows, today)? {
                Some(path) => println!("wrote {} rows to {}", rows.len(), path.display()),
                None => println!("no records to export"),
            }
        }
        Commands::Check => run_check(&config),
    }

    Ok(())
}

fn run_check(config: &pricewatch_core::AppConfig) {
    println!("{config:#?}");

    let credentials = config.merchant_id.is_some() && config.merchant_key.is_some();
    println!(
        "ranking source: {}",
        if credentials {
            "credentials configured"
        } else {
            "missing PRICEWATCH_MERCHANT_ID or PRICEWATCH_MERCHANT_KEY"
        }
    );

    match load::known_brands(config) {
        Ok(brands) => println!("known brands: {}", brands.brands.len()),
        Err(e) => println!("known brands: invalid ({e})"),
    }
}
