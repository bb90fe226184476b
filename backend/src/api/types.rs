//! REST API types for the dashboard front end.
//!
//! Every successful response is a [`ViewResponse`] envelope around one view;
//! every failure is an [`error_response`] body.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::EnrichedRecord;
use crate::transform::companies::{CompanyDisplayRow, CompanyTable, ScatterPoint};
use crate::transform::pipeline::positive_only;

/// Envelope sent for every view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse<T> {
    /// Unique identifier of this response
    pub request_id: String,

    /// Always "ok"; failures use [`error_response`]
    pub status: String,

    pub generated_at: DateTime<Utc>,

    /// Row counts of the main table
    pub metadata: TableMetadata,

    pub view: T,
}

impl<T> ViewResponse<T> {
    pub fn new(view: T, metadata: TableMetadata) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            status: "ok".to_string(),
            generated_at: Utc::now(),
            metadata,
            view,
        }
    }
}

/// Row counts of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub rows: usize,
    /// Rows with a strictly positive value (what treemaps show)
    pub positive_rows: usize,
    /// Rows with no observed value
    pub placeholders: usize,
}

impl TableMetadata {
    pub fn for_records(records: &[EnrichedRecord]) -> Self {
        Self {
            rows: records.len(),
            positive_rows: positive_only(records).len(),
            placeholders: records.iter().filter(|r| r.is_placeholder()).count(),
        }
    }
}

/// The company view as sent to the front end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompaniesPayload {
    pub companies: Vec<CompanyDisplayRow>,
    pub scatter: Vec<ScatterPoint>,
    /// Options of the sector picker, from the whole dataset
    pub sectors: Vec<String>,
    /// Options of the industry picker, from the whole dataset
    pub industries: Vec<String>,
}

impl CompaniesPayload {
    /// Build the payload; options always come from `all`, rows from `selected`.
    pub fn new(all: &CompanyTable, selected: &CompanyTable) -> Self {
        Self {
            companies: selected.display_rows(),
            scatter: selected.scatter_points(),
            sectors: all.sector_options(),
            industries: all.industry_options(),
        }
    }

    pub fn metadata(&self) -> TableMetadata {
        TableMetadata {
            rows: self.companies.len(),
            positive_rows: self.scatter.len(),
            placeholders: 0,
        }
    }
}

/// Create an error response
pub fn error_response(kind: &str, error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "kind": kind,
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TradeRecord;
    use crate::transform::normalize::normalize;

    #[test]
    fn test_table_metadata() {
        let mut records = normalize(vec![
            TradeRecord::new("China", 10.0),
            TradeRecord::new("Chad", 0.0),
        ])
        .unwrap();
        records.push(EnrichedRecord::placeholder("Peru"));

        let meta = TableMetadata::for_records(&records);
        assert_eq!(meta, TableMetadata { rows: 3, positive_rows: 1, placeholders: 1 });
    }

    #[test]
    fn test_envelope_format() {
        let response = ViewResponse::new(json!({ "records": [] }), TableMetadata::default());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["requestId"].is_string());
        assert_eq!(json["metadata"]["positiveRows"], 0);
    }

    #[test]
    fn test_error_response() {
        let body = error_response("lookup", "Not found: product 'Spaceships'");
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "lookup");
        assert!(body["error"].as_str().unwrap().contains("Spaceships"));
    }
}
