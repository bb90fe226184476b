//! Tradeboard CLI - export statistics as chart-ready JSON tables
//!
//! # Main Commands
//!
//! ```bash
//! tradeboard serve                       # Start HTTP server (port 3000)
//! tradeboard destinations                # Ranked export destinations
//! tradeboard products --threshold 1.5    # Products and section shares
//! tradeboard product "Cars"              # Destinations of one product
//! tradeboard companies --sector Technology
//! ```
//!
//! # Offline Commands (saved API responses)
//!
//! ```bash
//! tradeboard normalize response.json --view destinations
//! tradeboard normalize cars.json --view product-destinations --reference all.json
//! tradeboard bucket products.json --threshold 2
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tradeboard::{
    build_destinations, build_products, normalize_view, parse_response, reconcile_entity_coverage,
    CompanyTable, DashboardConfig, ExportQuery, OecClient, TradeView,
};

#[derive(Parser)]
#[command(name = "tradeboard")]
#[command(about = "Export statistics from the OEC API as chart-ready tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct QueryArgs {
    /// OEC exporter id (default: TRADEBOARD_COUNTRY or askor)
    #[arg(short, long)]
    country: Option<String>,

    /// Trade year (default: TRADEBOARD_YEAR or 2022)
    #[arg(short, long)]
    year: Option<u16>,
}

impl QueryArgs {
    fn resolve(self, config: &DashboardConfig) -> ExportQuery {
        ExportQuery {
            country: self.country.unwrap_or_else(|| config.query.country.clone()),
            year: self.year.unwrap_or(config.query.year),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Destinations,
    Products,
    ProductDestinations,
}

impl From<ViewArg> for TradeView {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Destinations => TradeView::Destinations,
            ViewArg::Products => TradeView::Products,
            ViewArg::ProductDestinations => TradeView::ProductDestinations,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked export destinations
    Destinations {
        #[command(flatten)]
        query: QueryArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Exported products with section shares
    Products {
        #[command(flatten)]
        query: QueryArgs,

        /// Sections below this share (%) are grouped as "Others"
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Destinations of a single product (HS4 name)
    Product {
        /// Product name, as listed by `products`
        name: String,

        #[command(flatten)]
        query: QueryArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Company table and scatter data
    Companies {
        /// Company CSV (default: TRADEBOARD_COMPANY_CSV or skcompany.csv)
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long)]
        sector: Option<String>,

        #[arg(long)]
        industry: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transform a saved API response
    Normalize {
        /// Saved response JSON
        input: PathBuf,

        #[arg(long, value_enum, default_value = "destinations")]
        view: ViewArg,

        /// Saved destinations response to pad missing countries from
        #[arg(long)]
        reference: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Section shares of a saved products response
    Bucket {
        /// Saved products response JSON
        input: PathBuf,

        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TRADEBOARD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let config = DashboardConfig::from_env();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Destinations { query, output } => {
            cmd_destinations(&config, query.resolve(&config), output.as_deref()).await
        }

        Commands::Products {
            query,
            threshold,
            output,
        } => {
            let threshold = threshold.unwrap_or(config.bucket_threshold);
            cmd_products(&config, query.resolve(&config), threshold, output.as_deref()).await
        }

        Commands::Product {
            name,
            query,
            output,
        } => cmd_product(&config, query.resolve(&config), &name, output.as_deref()).await,

        Commands::Companies {
            file,
            sector,
            industry,
            output,
        } => cmd_companies(
            file.as_deref().unwrap_or(config.company_csv.as_path()),
            sector.as_deref(),
            industry.as_deref(),
            output.as_deref(),
        ),

        Commands::Normalize {
            input,
            view,
            reference,
            output,
        } => cmd_normalize(&input, view.into(), reference.as_deref(), output.as_deref()),

        Commands::Bucket {
            input,
            threshold,
            output,
        } => cmd_bucket(
            &input,
            threshold.unwrap_or(config.bucket_threshold),
            output.as_deref(),
        ),

        Commands::Serve { port } => {
            let config = DashboardConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            tradeboard::server::start_server(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_destinations(
    config: &DashboardConfig,
    query: ExportQuery,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = OecClient::new(config)?;
    let view = tradeboard::destinations(&client, &query).await?;

    eprintln!("🌍 {} destinations", view.records.len());
    for record in view.records.iter().take(5) {
        eprintln!(
            "   {:<30} {:>12} {:>7.2}%",
            record.entity,
            record.display_value.as_deref().unwrap_or("-"),
            record.percentage.unwrap_or(0.0)
        );
    }

    write_json(&view, output)
}

async fn cmd_products(
    config: &DashboardConfig,
    query: ExportQuery,
    threshold: f64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = OecClient::new(config)?;
    let view = tradeboard::products(&client, &query, threshold).await?;

    eprintln!("📦 {} products", view.records.len());
    for section in &view.sections {
        eprintln!("   {:<40} {:>7.2}%", section.label, section.percentage);
    }

    write_json(&view, output)
}

async fn cmd_product(
    config: &DashboardConfig,
    query: ExportQuery,
    name: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = OecClient::new(config)?;
    let view = tradeboard::product_destinations(&client, &query, name).await?;

    eprintln!(
        "🗺️  {} (HS4 {}): {} destinations, {} placeholders",
        view.product,
        view.hs4_id,
        view.records.len() - view.placeholders,
        view.placeholders
    );

    write_json(&view, output)
}

fn cmd_companies(
    path: &Path,
    sector: Option<&str>,
    industry: Option<&str>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Loading companies: {}", path.display());

    let all = CompanyTable::load(path)?;
    let selected = all.filter(sector, industry);
    eprintln!("   {} of {} companies selected", selected.records.len(), all.records.len());

    let payload = tradeboard::CompaniesPayload::new(&all, &selected);
    write_json(&payload, output)
}

fn cmd_normalize(
    input: &Path,
    view: TradeView,
    reference: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Normalizing {}: {}", view.describe(), input.display());

    let rows = parse_response(view, &fs::read_to_string(input)?)?;
    eprintln!("   {} rows", rows.len());

    match view {
        TradeView::Destinations => {
            let table = build_destinations(ExportQuery::default(), rows)?;
            write_json(&table.records, output)
        }
        TradeView::Products => write_json(&normalize_view(view, rows)?, output),
        TradeView::ProductDestinations => {
            let mut records = normalize_view(view, rows)?;
            if let Some(reference_path) = reference {
                let reference_rows = parse_response(
                    TradeView::Destinations,
                    &fs::read_to_string(reference_path)?,
                )?;
                let before = records.len();
                records = reconcile_entity_coverage(
                    records,
                    &normalize_view(TradeView::Destinations, reference_rows)?,
                );
                eprintln!("   {} placeholders added", records.len() - before);
            }
            write_json(&records, output)
        }
    }
}

fn cmd_bucket(
    input: &Path,
    threshold: f64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Bucketing sections: {}", input.display());

    let rows = parse_response(TradeView::Products, &fs::read_to_string(input)?)?;
    let view = build_products(ExportQuery::default(), rows, threshold)?;
    eprintln!("   {} sections (threshold {}%)", view.sections.len(), threshold);

    write_json(&view.sections, output)
}

fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string_pretty(value)?;
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
