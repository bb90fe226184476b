//! HTTP Server for the Tradeboard API.
//!
//! Each endpoint is one independent dashboard view: a failure in one never
//! affects the others, and nothing is shared between requests except the
//! configuration and the HTTP client.
//!
//! # API Endpoints
//!
//! | Method | Path                                         | Description                     |
//! |--------|----------------------------------------------|---------------------------------|
//! | GET    | `/health`                                    | Health check                    |
//! | GET    | `/api/exports/destinations`                  | Export destinations             |
//! | GET    | `/api/exports/products?threshold=`           | Export products and sections    |
//! | GET    | `/api/exports/products/destinations?product=`| Destinations of one product     |
//! | GET    | `/api/companies?sector=&industry=`           | Company table and scatter data  |
//! | GET    | `/api/logs`                                  | SSE stream for real-time logs   |
//!
//! Trade endpoints also accept `country` and `year`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{header, Method},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{CompaniesPayload, TableMetadata, ViewResponse};
use crate::config::DashboardConfig;
use crate::error::{CompanyError, DashboardError, ServerError, ServerResult};
use crate::models::ExportQuery;
use crate::source::OecClient;
use crate::transform::companies::CompanyTable;
use crate::transform::pipeline::{
    self, DestinationsView, ProductDestinationsView, ProductsView,
};

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,
    pub client: OecClient,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> ServerResult<Self> {
        let client = OecClient::new(&config)
            .map_err(|e| ServerError::Internal(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Configured exporter/year with per-request overrides applied.
    fn export_query(&self, params: &TradeParams) -> ExportQuery {
        ExportQuery {
            country: params
                .country
                .clone()
                .unwrap_or_else(|| self.config.query.country.clone()),
            year: params.year.unwrap_or(self.config.query.year),
        }
    }
}

/// Query string accepted by trade endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TradeParams {
    pub country: Option<String>,
    pub year: Option<u16>,
    pub threshold: Option<f64>,
    pub product: Option<String>,
}

/// Query string accepted by the company endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct CompanyParams {
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/exports/destinations", get(export_destinations))
        .route("/api/exports/products", get(export_products))
        .route("/api/exports/products/destinations", get(export_product_destinations))
        .route("/api/companies", get(companies))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let state = AppState::new(config)?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Tradeboard server running on http://localhost:{}", port);
    println!("   GET  /api/exports/destinations");
    println!("   GET  /api/exports/products");
    println!("   GET  /api/exports/products/destinations?product=...");
    println!("   GET  /api/companies");
    println!("   GET  /api/logs   - SSE log stream");
    println!("   GET  /health     - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "tradeboard",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "destinations": "GET /api/exports/destinations",
            "products": "GET /api/exports/products",
            "productDestinations": "GET /api/exports/products/destinations?product=",
            "companies": "GET /api/companies",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        // Lagged subscribers just skip what they missed
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn export_destinations(
    State(state): State<AppState>,
    Query(params): Query<TradeParams>,
) -> ServerResult<Json<ViewResponse<DestinationsView>>> {
    let query = state.export_query(&params);
    let view = pipeline::destinations(&state.client, &query)
        .await
        .map_err(report)?;

    let metadata = TableMetadata::for_records(&view.records);
    Ok(Json(ViewResponse::new(view, metadata)))
}

async fn export_products(
    State(state): State<AppState>,
    Query(params): Query<TradeParams>,
) -> ServerResult<Json<ViewResponse<ProductsView>>> {
    let query = state.export_query(&params);
    let threshold = params.threshold.unwrap_or(state.config.bucket_threshold);
    let view = pipeline::products(&state.client, &query, threshold)
        .await
        .map_err(report)?;

    let metadata = TableMetadata::for_records(&view.records);
    Ok(Json(ViewResponse::new(view, metadata)))
}

async fn export_product_destinations(
    State(state): State<AppState>,
    Query(params): Query<TradeParams>,
) -> ServerResult<Json<ViewResponse<ProductDestinationsView>>> {
    let product = params
        .product
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ServerError::BadRequest("missing 'product' parameter".to_string()))?;

    let query = state.export_query(&params);
    let view = pipeline::product_destinations(&state.client, &query, product)
        .await
        .map_err(report)?;

    let metadata = TableMetadata::for_records(&view.records);
    Ok(Json(ViewResponse::new(view, metadata)))
}

async fn companies(
    State(state): State<AppState>,
    Query(params): Query<CompanyParams>,
) -> ServerResult<Json<ViewResponse<CompaniesPayload>>> {
    log_info(format!("📄 Loading companies from {}", state.config.company_csv.display()));

    let bytes = tokio::fs::read(&state.config.company_csv)
        .await
        .map_err(|e| report(DashboardError::Company(CompanyError::Io(e))))?;
    let all = CompanyTable::from_bytes(&bytes).map_err(report)?;
    let selected = all.filter(params.sector.as_deref(), params.industry.as_deref());

    let payload = CompaniesPayload::new(&all, &selected);
    let metadata = payload.metadata();
    Ok(Json(ViewResponse::new(payload, metadata)))
}

/// Log a view failure and lift it into a server error.
fn report(e: DashboardError) -> ServerError {
    log_error(e.to_string());
    ServerError::from(e)
}
