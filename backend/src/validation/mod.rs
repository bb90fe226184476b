//! JSON Schema validation for upstream OEC responses.
//!
//! Every response body is checked against an embedded schema before it is
//! mapped into [`TradeRecord`](crate::models::TradeRecord)s, so a renamed or
//! missing field fails at the fetch boundary instead of deep in a chart.
//!
//! # Embedded Schemas
//!
//! Schemas are embedded at compile time from the `schemas/` directory:
//! - `oec-destinations.json` - country rows (destinations, product destinations)
//! - `oec-products.json` - HS4 product rows
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use tradeboard::{validate_response, TradeView};
//!
//! let body = json!({ "data": [{ "Country": "China", "Trade Value": 1.0e9 }] });
//! assert!(validate_response(TradeView::Destinations, &body).is_ok());
//! ```

use serde_json::Value;

use crate::models::TradeView;

const DESTINATIONS_SCHEMA: &str = include_str!("../../schemas/oec-destinations.json");
const PRODUCTS_SCHEMA: &str = include_str!("../../schemas/oec-products.json");

/// Validate a JSON value against a JSON Schema (draft 7).
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation otherwise
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use tradeboard::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": {
///         "name": { "type": "string" }
///     }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The embedded schema a view's response must satisfy.
pub fn schema_for(view: TradeView) -> Result<Value, Vec<String>> {
    let raw = match view {
        TradeView::Destinations | TradeView::ProductDestinations => DESTINATIONS_SCHEMA,
        TradeView::Products => PRODUCTS_SCHEMA,
    };
    serde_json::from_str(raw).map_err(|e| vec![format!("Invalid embedded schema: {}", e)])
}

/// Validate a full response body for the given view.
pub fn validate_response(view: TradeView, data: &Value) -> Result<(), Vec<String>> {
    let schema = schema_for(view)?;
    validate(&schema, data)
}

/// Quick check of a response body.
pub fn is_valid_response(view: TradeView, data: &Value) -> bool {
    validate_response(view, data).is_ok()
}
