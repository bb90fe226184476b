//! # Tradeboard - export statistics for dashboards
//!
//! Tradeboard fetches one country's export statistics from the OEC API and
//! turns them into chart-ready tables: ranked destinations, products with
//! section shares, and single-product destination maps. A second view serves
//! a static company dataset.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  OEC OLAP   │────▶│   Source    │────▶│  Transform  │────▶│ JSON tables │
//! │    API      │     │ (validated) │     │ (normalize, │     │ (HTTP/CLI)  │
//! └─────────────┘     └─────────────┘     │  bucket,    │     └─────────────┘
//!                                         │  reconcile) │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tradeboard::{products, ExportQuery, OecClient, DEFAULT_THRESHOLD};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = OecClient::from_env().unwrap();
//!     let view = products(&client, &ExportQuery::default(), DEFAULT_THRESHOLD).await.unwrap();
//!     println!("{} sections", view.sections.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Layered error types
//! - [`models`] - Trade and company records
//! - [`config`] - Environment configuration
//! - [`source`] - OEC API client
//! - [`validation`] - Response schema validation
//! - [`transform`] - Normalize, bucket, reconcile, views
//! - [`parser`] - Company CSV loading
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Inputs
pub mod parser;
pub mod source;
pub mod validation;

// Transformation
pub mod transform;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    CompanyError, DashboardError, DashboardResult, FetchError, ServerError, TransformError,
};

// =============================================================================
// Re-exports - Models & config
// =============================================================================

pub use config::DashboardConfig;
pub use models::{
    BucketedRecord, CompanyRecord, EnrichedRecord, ExportQuery, Taxonomy, TradeRecord, TradeView,
    OTHERS_LABEL,
};

// =============================================================================
// Re-exports - Inputs
// =============================================================================

pub use parser::{load_companies, parse_bytes_auto, parse_companies, ParseResult};
pub use source::{parse_response, OecClient};
pub use validation::{is_valid_response, validate, validate_response};

// =============================================================================
// Re-exports - Transformer
// =============================================================================

pub use transform::{
    bucket_by_category, format_display_value, log_value, normalize, reconcile_entity_coverage,
    DEFAULT_THRESHOLD,
};

// =============================================================================
// Re-exports - Views
// =============================================================================

pub use transform::pipeline::{
    build_destinations, build_product_destinations, build_products, destinations, find_product,
    normalize_view, positive_only, product_destinations, products, DestinationsView,
    ProductDestinationsView, ProductsView,
};
pub use transform::{CompanyDisplayRow, CompanyTable, ScatterPoint};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, CompaniesPayload, TableMetadata, ViewResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
