//! OEC trade source.
//!
//! Fetches export statistics from the OEC OLAP proxy and maps the untyped
//! response into [`TradeRecord`]s. Every body goes through the embedded
//! JSON Schema first (see [`crate::validation`]); nothing downstream ever
//! looks at raw JSON.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tradeboard::{DashboardConfig, OecClient, ExportQuery};
//!
//! let client = OecClient::new(&DashboardConfig::from_env())?;
//! let rows = client.fetch_destinations(&ExportQuery::default()).await?;
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::api::logs::{log_info, log_success};
use crate::config::DashboardConfig;
use crate::error::{FetchError, FetchResult};
use crate::models::{ExportQuery, Taxonomy, TradeRecord, TradeView};
use crate::validation::validate_response;

/// Longest upstream error body kept in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 500;

const MEASURE: &str = "Trade Value";
const ISO3_PROPERTY: &str = "Importer Country ISO 3";

/// OEC API client.
#[derive(Clone)]
pub struct OecClient {
    http: reqwest::Client,
    api_url: String,
    cube: String,
    timeout_secs: u64,
}

impl OecClient {
    /// Build a client with the configured endpoint and timeout.
    pub fn new(config: &DashboardConfig) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tradeboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            cube: config.cube.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Create a client from `TRADEBOARD_*` environment variables.
    pub fn from_env() -> FetchResult<Self> {
        Self::new(&DashboardConfig::from_env())
    }

    /// Export destinations of all products, one row per importing country.
    pub async fn fetch_destinations(&self, query: &ExportQuery) -> FetchResult<Vec<TradeRecord>> {
        self.fetch(TradeView::Destinations, query, None).await
    }

    /// Exported products, one row per HS4 category.
    pub async fn fetch_products(&self, query: &ExportQuery) -> FetchResult<Vec<TradeRecord>> {
        self.fetch(TradeView::Products, query, None).await
    }

    /// Destinations of a single HS4 product.
    pub async fn fetch_product_destinations(
        &self,
        query: &ExportQuery,
        hs4_id: &str,
    ) -> FetchResult<Vec<TradeRecord>> {
        self.fetch(TradeView::ProductDestinations, query, Some(hs4_id)).await
    }

    /// Query string for a view.
    pub fn query_params(
        &self,
        view: TradeView,
        query: &ExportQuery,
        hs4_id: Option<&str>,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("cube", self.cube.clone()),
            ("Exporter Country", query.country.clone()),
            ("Year", query.year.to_string()),
            ("measures", MEASURE.to_string()),
            ("parents", "true".to_string()),
        ];

        match view {
            TradeView::Destinations => {
                params.push(("drilldowns", "Year,Importer Country".to_string()));
                params.push(("properties", ISO3_PROPERTY.to_string()));
            }
            TradeView::Products => {
                params.push(("drilldowns", "HS4".to_string()));
                params.push(("sparse", "false".to_string()));
                params.push(("locale", "en".to_string()));
            }
            TradeView::ProductDestinations => {
                if let Some(id) = hs4_id {
                    params.push(("HS4", id.to_string()));
                }
                params.push(("drilldowns", "Importer Country".to_string()));
                params.push(("sparse", "false".to_string()));
                params.push(("locale", "en".to_string()));
                params.push(("properties", ISO3_PROPERTY.to_string()));
            }
        }

        params
    }

    async fn fetch(
        &self,
        view: TradeView,
        query: &ExportQuery,
        hs4_id: Option<&str>,
    ) -> FetchResult<Vec<TradeRecord>> {
        log_info(format!(
            "📡 Fetching {} for {} ({})",
            view.describe(),
            query.country,
            query.year
        ));

        let response = self
            .http
            .get(&self.api_url)
            .query(&self.query_params(view, query, hs4_id))
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let records = parse_response(view, &body)?;
        log_success(format!("Received {} rows", records.len()));
        Ok(records)
    }

    fn request_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

// =============================================================================
// Response mapping
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Continent", default)]
    continent: Option<String>,
    #[serde(rename = "Importer Country ISO 3", default)]
    importer_iso3: Option<String>,
    #[serde(rename = "Country ISO 3", default)]
    country_iso3: Option<String>,
    #[serde(rename = "Trade Value")]
    trade_value: f64,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(rename = "HS4")]
    hs4: String,
    #[serde(rename = "HS4 ID")]
    hs4_id: Value,
    #[serde(rename = "HS2", default)]
    hs2: Option<String>,
    #[serde(rename = "Section", default)]
    section: Option<String>,
    #[serde(rename = "Trade Value")]
    trade_value: f64,
}

impl From<CountryRow> for TradeRecord {
    fn from(row: CountryRow) -> Self {
        TradeRecord::new(row.country, row.trade_value).with_taxonomy(Taxonomy {
            continent: row.continent,
            iso3: row.importer_iso3.or(row.country_iso3),
            ..Default::default()
        })
    }
}

impl From<ProductRow> for TradeRecord {
    fn from(row: ProductRow) -> Self {
        TradeRecord::new(row.hs4, row.trade_value).with_taxonomy(Taxonomy {
            section: row.section,
            hs2: row.hs2,
            hs4_id: id_to_string(&row.hs4_id),
            ..Default::default()
        })
    }
}

/// HS4 ids arrive as numbers or strings depending on the cube.
fn id_to_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Validate a response body and map it into trade records.
///
/// An empty `data` array is not an error here; views decide what an empty
/// result means for them.
pub fn parse_response(view: TradeView, body: &str) -> FetchResult<Vec<TradeRecord>> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| FetchError::MalformedJson(e.to_string()))?;

    validate_response(view, &json).map_err(|errors| FetchError::Schema { errors })?;

    let records = match view {
        TradeView::Destinations | TradeView::ProductDestinations => {
            let body: ResponseBody<CountryRow> = serde_json::from_value(json)
                .map_err(|e| FetchError::Schema { errors: vec![e.to_string()] })?;
            body.data.into_iter().map(TradeRecord::from).collect()
        }
        TradeView::Products => {
            let body: ResponseBody<ProductRow> = serde_json::from_value(json)
                .map_err(|e| FetchError::Schema { errors: vec![e.to_string()] })?;
            body.data.into_iter().map(TradeRecord::from).collect()
        }
    };

    Ok(records)
}
