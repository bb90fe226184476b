//! Company view: the static company dataset, projected for display.
//!
//! No derived fields; only column projection, option lists for the sector
//! and industry pickers, and selection.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::api::logs::log_success;
use crate::error::DashboardResult;
use crate::models::CompanyRecord;
use crate::parser::{load_companies, parse_bytes_auto};

/// Row shown in the company table. `Symbol` and `Market_Cap` are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDisplayRow {
    pub company: String,
    pub sector: String,
    pub industry: String,
    pub revenue: f64,
}

/// Point of the market cap / revenue scatter plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub company: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub revenue: f64,
}

/// The loaded company dataset.
#[derive(Debug, Clone, Default)]
pub struct CompanyTable {
    pub records: Vec<CompanyRecord>,
}

impl CompanyTable {
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    /// Load and parse a company file.
    pub fn load(path: impl AsRef<Path>) -> DashboardResult<Self> {
        let result = load_companies(path)?;
        log_success(format!(
            "Loaded {} companies ({}, '{}')",
            result.records.len(),
            result.encoding,
            result.delimiter
        ));
        Ok(Self::new(result.records))
    }

    /// Parse an already-read company file.
    pub fn from_bytes(bytes: &[u8]) -> DashboardResult<Self> {
        let result = parse_bytes_auto(bytes)?;
        Ok(Self::new(result.records))
    }

    pub fn display_rows(&self) -> Vec<CompanyDisplayRow> {
        self.records
            .iter()
            .map(|c| CompanyDisplayRow {
                company: c.company.clone(),
                sector: c.sector.clone(),
                industry: c.industry.clone(),
                revenue: c.revenue,
            })
            .collect()
    }

    /// Distinct sectors, first-seen order.
    pub fn sector_options(&self) -> Vec<String> {
        unique(self.records.iter().map(|c| c.sector.as_str()))
    }

    /// Distinct industries, first-seen order.
    pub fn industry_options(&self) -> Vec<String> {
        unique(self.records.iter().map(|c| c.industry.as_str()))
    }

    /// Companies matching the selected sector and/or industry.
    ///
    /// `None` means "no selection" for that field.
    pub fn filter(&self, sector: Option<&str>, industry: Option<&str>) -> CompanyTable {
        let records = self
            .records
            .iter()
            .filter(|c| sector.map_or(true, |s| c.sector == s))
            .filter(|c| industry.map_or(true, |i| c.industry == i))
            .cloned()
            .collect();
        CompanyTable::new(records)
    }

    /// Points for the log-log scatter plot. Both measures must be positive.
    pub fn scatter_points(&self) -> Vec<ScatterPoint> {
        self.records
            .iter()
            .filter(|c| c.market_cap > 0.0 && c.revenue > 0.0)
            .map(|c| ScatterPoint {
                company: c.company.clone(),
                sector: c.sector.clone(),
                industry: c.industry.clone(),
                market_cap: c.market_cap,
                revenue: c.revenue,
            })
            .collect()
    }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, sector: &str, industry: &str, cap: f64, revenue: f64) -> CompanyRecord {
        CompanyRecord {
            company: name.into(),
            symbol: String::new(),
            sector: sector.into(),
            industry: industry.into(),
            market_cap: cap,
            revenue,
        }
    }

    fn table() -> CompanyTable {
        CompanyTable::new(vec![
            company("Samsung Electronics", "Technology", "Semiconductors", 420.0, 302.0),
            company("Hyundai Motor", "Consumer Cyclical", "Auto Manufacturers", 45.0, 142.0),
            company("SK Hynix", "Technology", "Semiconductors", 120.0, 44.0),
            company("Kakao", "Communication", "Internet Content", 20.0, 0.0),
        ])
    }

    #[test]
    fn test_display_rows_drop_symbol_and_cap() {
        let rows = table().display_rows();
        assert_eq!(rows.len(), 4);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert!(json.get("symbol").is_none());
        assert!(json.get("marketCap").is_none());
        assert_eq!(json["company"], "Samsung Electronics");
    }

    #[test]
    fn test_options_unique_in_order() {
        let t = table();
        assert_eq!(
            t.sector_options(),
            vec!["Technology", "Consumer Cyclical", "Communication"]
        );
        assert_eq!(t.industry_options().len(), 3);
    }

    #[test]
    fn test_filter() {
        let t = table();
        assert_eq!(t.filter(Some("Technology"), None).records.len(), 2);
        assert_eq!(t.filter(Some("Technology"), Some("Auto Manufacturers")).records.len(), 0);
        assert_eq!(t.filter(None, None).records.len(), 4);
    }

    #[test]
    fn test_scatter_points_need_positive_measures() {
        let points = table().scatter_points();
        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.company != "Kakao"));
    }
}
