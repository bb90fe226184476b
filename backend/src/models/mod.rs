//! Domain models for the Tradeboard pipeline.
//!
//! - [`TradeRecord`] - one raw (entity, value) row from the trade source
//! - [`Taxonomy`] - optional classification attributes carried through unchanged
//! - [`EnrichedRecord`] - a trade record with share, display and color-scale fields
//! - [`BucketedRecord`] - one category row after "Others" collapsing
//! - [`CompanyRecord`] - one row of the static company dataset
//! - [`TradeView`] / [`ExportQuery`] - which table is requested, and for whom

use serde::{Deserialize, Serialize};

/// Label of the synthetic bucket that absorbs low-share categories.
pub const OTHERS_LABEL: &str = "Others";

/// Label used for records that carry no top-level category.
pub const UNCLASSIFIED_LABEL: &str = "Unclassified";

// =============================================================================
// Trade Records
// =============================================================================

/// Classification attributes attached to a trade row.
///
/// Countries carry `continent` (and usually `iso3`); products carry the
/// HS hierarchy (`section` > `hs2` > HS4 entity) and their `hs4_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxonomy {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub continent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hs2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hs4_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub iso3: Option<String>,
}

impl Taxonomy {
    /// Top-level category label used for bucketing.
    ///
    /// Product sections take precedence over continents.
    pub fn top_level(&self) -> Option<&str> {
        self.section.as_deref().or(self.continent.as_deref())
    }
}

/// One row of raw trade data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    /// Country name or product category name.
    pub entity: String,
    /// Raw amount in source currency units.
    pub trade_value: f64,
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

impl TradeRecord {
    pub fn new(entity: impl Into<String>, trade_value: f64) -> Self {
        Self {
            entity: entity.into(),
            trade_value,
            taxonomy: Taxonomy::default(),
        }
    }

    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = taxonomy;
        self
    }
}

/// A trade record with derived fields.
///
/// Every numeric field is optional: a placeholder inserted for map coverage
/// has no observed value, which is different from an observed zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecord {
    pub entity: String,
    pub trade_value: Option<f64>,
    /// Share of the set total, 0-100, two decimals.
    pub percentage: Option<f64>,
    /// Human-readable amount, e.g. `$70.00 M`.
    pub display_value: Option<String>,
    /// `ln(1 + value)`, for color scales only.
    pub log_value: Option<f64>,
    #[serde(default)]
    pub taxonomy: Taxonomy,
}

impl EnrichedRecord {
    /// A record that only names an entity. Nothing was observed for it.
    pub fn placeholder(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            trade_value: None,
            percentage: None,
            display_value: None,
            log_value: None,
            taxonomy: Taxonomy::default(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.trade_value.is_none()
    }
}

/// One category after bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedRecord {
    pub label: String,
    /// Summed share of the category, 0-100, two decimals.
    pub percentage: f64,
    /// Summed raw value of the category.
    pub trade_value: f64,
    /// Number of records folded into this row.
    pub members: usize,
}

// =============================================================================
// Companies
// =============================================================================

/// One company from the static dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Symbol", default)]
    pub symbol: String,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    /// Market capitalization, in billions.
    #[serde(rename = "Market_Cap")]
    pub market_cap: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
}

// =============================================================================
// Queries
// =============================================================================

/// The trade tables the source can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TradeView {
    /// Export destinations, one row per importing country.
    Destinations,
    /// Exported products, one row per HS4 category.
    Products,
    /// Destinations of a single HS4 product.
    ProductDestinations,
}

impl TradeView {
    /// Human-readable name, used in log lines and error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Destinations => "export destinations",
            Self::Products => "export products",
            Self::ProductDestinations => "product destinations",
        }
    }
}

/// Exporter and year a trade view is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportQuery {
    /// OEC exporter id, e.g. `askor` for South Korea.
    pub country: String,
    pub year: u16,
}

impl Default for ExportQuery {
    fn default() -> Self {
        Self {
            country: "askor".to_string(),
            year: 2022,
        }
    }
}
