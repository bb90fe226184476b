//! Dashboard views: fetch, transform, and package one table per request.
//!
//! Each view is a pure function of its request parameters and the rows the
//! source returned. The `build_*` functions do the transformation on rows
//! already in hand; the async wrappers fetch first.
//!
//! ```text
//! ExportQuery ──▶ OecClient ──▶ normalize ──▶ (bucket | reconcile) ──▶ view
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use tradeboard::{destinations, ExportQuery, OecClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OecClient::from_env()?;
//!     let view = destinations(&client, &ExportQuery::default()).await?;
//!     println!("{} destinations", view.records.len());
//!     Ok(())
//! }
//! ```

use serde::Serialize;

use super::grouper::bucket_by_category;
use super::normalize::normalize;
use super::reconcile::reconcile_entity_coverage;
use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{DashboardError, DashboardResult};
use crate::models::{BucketedRecord, EnrichedRecord, ExportQuery, TradeRecord, TradeView};
use crate::source::OecClient;

/// Export destinations of all products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationsView {
    pub query: ExportQuery,
    pub records: Vec<EnrichedRecord>,
}

/// Exported products with their section breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsView {
    pub query: ExportQuery,
    pub records: Vec<EnrichedRecord>,
    /// Section shares, small sections folded into "Others".
    pub sections: Vec<BucketedRecord>,
    pub threshold: f64,
}

/// Destinations of one product, padded to the full destination list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDestinationsView {
    pub query: ExportQuery,
    pub product: String,
    pub hs4_id: String,
    pub records: Vec<EnrichedRecord>,
    /// How many placeholder rows were added for map coverage.
    pub placeholders: usize,
}

// =============================================================================
// Pure view builders
// =============================================================================

/// Build the destinations view from fetched rows.
pub fn build_destinations(
    query: ExportQuery,
    rows: Vec<TradeRecord>,
) -> DashboardResult<DestinationsView> {
    ensure_rows(TradeView::Destinations.describe(), &rows)?;
    let records = normalize(rows)?;
    Ok(DestinationsView { query, records })
}

/// Build the products view and its section buckets.
pub fn build_products(
    query: ExportQuery,
    rows: Vec<TradeRecord>,
    threshold: f64,
) -> DashboardResult<ProductsView> {
    ensure_rows(TradeView::Products.describe(), &rows)?;
    let records = normalize(rows)?;
    let sections = bucket_by_category(&records, threshold)?;
    Ok(ProductsView {
        query,
        records,
        sections,
        threshold,
    })
}

/// Find the HS4 id of a product by its display name.
pub fn find_product<'a>(products: &'a [EnrichedRecord], name: &str) -> DashboardResult<&'a str> {
    products
        .iter()
        .find(|r| r.entity == name)
        .and_then(|r| r.taxonomy.hs4_id.as_deref())
        .ok_or_else(|| DashboardError::Lookup(format!("product '{}'", name)))
}

/// Build the single-product destinations view.
///
/// `reference` is the destinations table of all products; every country in
/// it that this product does not reach is added as a placeholder.
pub fn build_product_destinations(
    query: ExportQuery,
    product: &str,
    hs4_id: &str,
    rows: Vec<TradeRecord>,
    reference: &[EnrichedRecord],
) -> DashboardResult<ProductDestinationsView> {
    ensure_rows(&format!("{} ({})", TradeView::ProductDestinations.describe(), product), &rows)?;
    let normalized = normalize(rows)?;
    let observed = normalized.len();
    let records = reconcile_entity_coverage(normalized, reference);

    Ok(ProductDestinationsView {
        query,
        product: product.to_string(),
        hs4_id: hs4_id.to_string(),
        placeholders: records.len() - observed,
        records,
    })
}

/// Normalize the rows of one view, without building the view around them.
///
/// No rows is [`DashboardError::EmptyData`], as for the full views.
pub fn normalize_view(view: TradeView, rows: Vec<TradeRecord>) -> DashboardResult<Vec<EnrichedRecord>> {
    ensure_rows(view.describe(), &rows)?;
    Ok(normalize(rows)?)
}

/// Records with a strictly positive value, as fed to treemaps.
pub fn positive_only(records: &[EnrichedRecord]) -> Vec<&EnrichedRecord> {
    records
        .iter()
        .filter(|r| r.trade_value.is_some_and(|v| v > 0.0))
        .collect()
}

fn ensure_rows(what: &str, rows: &[TradeRecord]) -> DashboardResult<()> {
    if rows.is_empty() {
        log_warning(format!("No data available for {}", what));
        return Err(DashboardError::EmptyData(what.to_string()));
    }
    Ok(())
}

// =============================================================================
// Fetching views
// =============================================================================

/// Fetch and build the destinations view.
pub async fn destinations(
    client: &OecClient,
    query: &ExportQuery,
) -> DashboardResult<DestinationsView> {
    let rows = client.fetch_destinations(query).await?;
    let view = build_destinations(query.clone(), rows)?;
    log_success(format!("{} destinations ranked", view.records.len()));
    Ok(view)
}

/// Fetch and build the products view.
pub async fn products(
    client: &OecClient,
    query: &ExportQuery,
    threshold: f64,
) -> DashboardResult<ProductsView> {
    let rows = client.fetch_products(query).await?;
    let view = build_products(query.clone(), rows, threshold)?;
    log_success(format!(
        "{} products in {} sections",
        view.records.len(),
        view.sections.len()
    ));
    Ok(view)
}

/// Look up a product, then fetch and build its destinations view.
///
/// The lookup runs against the products table before any destination
/// request is made, so an unknown product costs one fetch only.
pub async fn product_destinations(
    client: &OecClient,
    query: &ExportQuery,
    product: &str,
) -> DashboardResult<ProductDestinationsView> {
    let products = normalize_view(TradeView::Products, client.fetch_products(query).await?)?;
    let hs4_id = find_product(&products, product)?.to_string();
    log_info(format!("🔎 {} → HS4 {}", product, hs4_id));

    let reference =
        normalize_view(TradeView::Destinations, client.fetch_destinations(query).await?)?;
    let rows = client.fetch_product_destinations(query, &hs4_id).await?;

    let view = build_product_destinations(query.clone(), product, &hs4_id, rows, &reference)?;
    log_success(format!(
        "{} destinations for {} ({} placeholders)",
        view.records.len(),
        product,
        view.placeholders
    ));
    Ok(view)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransformError;
    use crate::models::Taxonomy;
    use crate::transform::grouper::DEFAULT_THRESHOLD;

    fn country(name: &str, value: f64) -> TradeRecord {
        TradeRecord::new(name, value).with_taxonomy(Taxonomy {
            continent: Some("Asia".into()),
            ..Default::default()
        })
    }

    fn product(name: &str, id: &str, section: &str, value: f64) -> TradeRecord {
        TradeRecord::new(name, value).with_taxonomy(Taxonomy {
            section: Some(section.into()),
            hs4_id: Some(id.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_destinations_view() {
        let view = build_destinations(
            ExportQuery::default(),
            vec![country("Japan", 30_000_000.0), country("China", 70_000_000.0)],
        )
        .unwrap();

        assert_eq!(view.records[0].entity, "China");
        assert_eq!(view.records[0].percentage, Some(70.0));
        assert_eq!(view.records[1].display_value.as_deref(), Some("$30.00 M"));
    }

    #[test]
    fn test_empty_rows_is_empty_data() {
        let err = build_destinations(ExportQuery::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, DashboardError::EmptyData(_)));
    }

    #[test]
    fn test_all_zero_rows_is_empty_input() {
        let err = build_destinations(ExportQuery::default(), vec![country("Chad", 0.0)]).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Transform(TransformError::EmptyInput { rows: 1, .. })
        ));
    }

    #[test]
    fn test_products_view_buckets_sections() {
        let view = build_products(
            ExportQuery::default(),
            vec![
                product("Cars", "178703", "Transportation", 995.0),
                product("Silk", "111001", "Textiles", 5.0),
            ],
            DEFAULT_THRESHOLD,
        )
        .unwrap();

        assert_eq!(view.records.len(), 2);
        let labels: Vec<_> = view.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Transportation", "Others"]);
    }

    #[test]
    fn test_find_product() {
        let products = normalize(vec![
            product("Cars", "178703", "Transportation", 10.0),
            product("Silk", "111001", "Textiles", 5.0),
        ])
        .unwrap();

        assert_eq!(find_product(&products, "Silk").unwrap(), "111001");
        assert!(matches!(
            find_product(&products, "Spaceships"),
            Err(DashboardError::Lookup(_))
        ));
    }

    #[test]
    fn test_product_destinations_padded_to_reference() {
        let reference = normalize(vec![
            country("China", 50.0),
            country("Japan", 30.0),
            country("Chad", 20.0),
        ])
        .unwrap();

        let view = build_product_destinations(
            ExportQuery::default(),
            "Cars",
            "178703",
            vec![country("Japan", 8.0), country("Mongolia", 2.0)],
            &reference,
        )
        .unwrap();

        assert_eq!(view.records.len(), 4);
        assert_eq!(view.placeholders, 2);
        assert_eq!(view.records[0].entity, "Japan");
        assert_eq!(view.records[0].percentage, Some(80.0));
        assert!(view
            .records
            .iter()
            .filter(|r| r.entity == "China" || r.entity == "Chad")
            .all(|r| r.is_placeholder()));
    }

    #[test]
    fn test_product_destinations_without_rows() {
        let err = build_product_destinations(ExportQuery::default(), "Cars", "178703", Vec::new(), &[])
            .unwrap_err();
        match err {
            DashboardError::EmptyData(what) => assert!(what.contains("Cars")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_view_without_rows_is_empty_data() {
        for view in [TradeView::Destinations, TradeView::Products, TradeView::ProductDestinations] {
            let err = normalize_view(view, Vec::new()).unwrap_err();
            assert!(matches!(err, DashboardError::EmptyData(_)), "{:?}", err);
        }

        let products = crate::source::parse_response(TradeView::Products, r#"{"data": []}"#).unwrap();
        assert!(matches!(
            normalize_view(TradeView::Products, products),
            Err(DashboardError::EmptyData(_))
        ));
    }

    #[test]
    fn test_normalize_view_all_zero_is_empty_input() {
        let err = normalize_view(TradeView::Products, vec![product("Silk", "111001", "Textiles", 0.0)])
            .unwrap_err();
        assert!(matches!(err, DashboardError::Transform(TransformError::EmptyInput { .. })));
    }

    #[test]
    fn test_positive_only() {
        let mut records = normalize(vec![country("China", 10.0), country("Chad", 0.0)]).unwrap();
        records.push(EnrichedRecord::placeholder("Peru"));

        let positive = positive_only(&records);
        assert_eq!(positive.len(), 1);
        assert_eq!(positive[0].entity, "China");
    }
}
