//! Turn raw trade rows into a sorted, share-annotated table.
//!
//! ```text
//! raw rows (any order)            →  enriched table (value desc)
//! ┌───────────────────────┐         ┌──────────────────────────────────────┐
//! │ Japan   30_000_000    │         │ China  70.00%  $70.00 M  ln(1+v)     │
//! │ China   70_000_000    │    →    │ Japan  30.00%  $30.00 M  ln(1+v)     │
//! └───────────────────────┘         └──────────────────────────────────────┘
//! ```
//!
//! Shares are always taken against the total of the whole input, including
//! zero rows that charts may later hide.

use std::cmp::Ordering;

use crate::error::{TransformError, TransformResult};
use crate::models::{EnrichedRecord, TradeRecord};

const MILLION: f64 = 1_000_000.0;
const BILLION: f64 = 1_000_000_000.0;

/// Sort, annotate and format a set of raw trade rows.
///
/// Fails with [`TransformError::EmptyInput`] when the set is empty or its
/// total is not a positive number, since shares would be undefined.
pub fn normalize(raw_rows: Vec<TradeRecord>) -> TransformResult<Vec<EnrichedRecord>> {
    let rows = raw_rows.len();
    let total: f64 = raw_rows.iter().map(|r| r.trade_value).sum();

    if rows == 0 || !total.is_finite() || total <= 0.0 {
        return Err(TransformError::EmptyInput { rows, total });
    }

    let mut sorted = raw_rows;
    sorted.sort_by(compare_descending);

    let shares = apportion_hundredths(&sorted, total);

    Ok(sorted
        .into_iter()
        .zip(shares)
        .map(|(record, hundredths)| enrich(record, hundredths))
        .collect())
}

/// Shares in hundredths of a percent, summing to exactly 100.00.
///
/// Each share is floored, then the leftover hundredths go to the rows with
/// the largest remainders. Equal remainders favor the earlier row.
fn apportion_hundredths(rows: &[TradeRecord], total: f64) -> Vec<i64> {
    const WHOLE: i64 = 10_000;

    let exact: Vec<f64> = rows
        .iter()
        .map(|r| r.trade_value / total * WHOLE as f64)
        .collect();
    let mut shares: Vec<i64> = exact.iter().map(|x| x.floor() as i64).collect();

    let assigned: i64 = shares.iter().sum();
    let leftover = (WHOLE - assigned).clamp(0, rows.len() as i64) as usize;

    let mut by_remainder: Vec<usize> = (0..rows.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });

    for &i in by_remainder.iter().take(leftover) {
        shares[i] += 1;
    }

    shares
}

/// Value descending, then entity label ascending.
fn compare_descending(a: &TradeRecord, b: &TradeRecord) -> Ordering {
    b.trade_value
        .total_cmp(&a.trade_value)
        .then_with(|| a.entity.cmp(&b.entity))
}

fn enrich(record: TradeRecord, hundredths: i64) -> EnrichedRecord {
    let value = record.trade_value;
    EnrichedRecord {
        entity: record.entity,
        trade_value: Some(value),
        percentage: Some(hundredths as f64 / 100.0),
        display_value: format_display_value(value),
        log_value: log_value(value),
        taxonomy: record.taxonomy,
    }
}

/// Format a raw amount as `$X.XX M` below one billion and `$X.XX B` above.
///
/// Digits past the second decimal are dropped, so a value just below the
/// billion threshold never displays as `$1000.00 M`.
pub fn format_display_value(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    // Divide by a power of ten directly: exact for whole amounts, unlike
    // scaling down then back up by 100.
    let (hundredths, unit) = if value < BILLION {
        ((value / (MILLION / 100.0)).trunc(), "M")
    } else {
        ((value / (BILLION / 100.0)).trunc(), "B")
    };

    Some(format!("${:.2} {}", hundredths / 100.0, unit))
}

/// `ln(1 + value)` for non-negative values; `None` otherwise.
pub fn log_value(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then(|| value.ln_1p())
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[(&str, f64)]) -> Vec<TradeRecord> {
        values
            .iter()
            .map(|(entity, value)| TradeRecord::new(*entity, *value))
            .collect()
    }

    #[test]
    fn test_two_country_scenario() {
        let table = normalize(rows(&[("China", 70_000_000.0), ("Japan", 30_000_000.0)])).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].entity, "China");
        assert_eq!(table[0].percentage, Some(70.0));
        assert_eq!(table[0].display_value.as_deref(), Some("$70.00 M"));
        assert_eq!(table[1].entity, "Japan");
        assert_eq!(table[1].percentage, Some(30.0));
        assert_eq!(table[1].display_value.as_deref(), Some("$30.00 M"));
    }

    #[test]
    fn test_sorted_descending() {
        let table = normalize(rows(&[
            ("A", 5.0),
            ("B", 500.0),
            ("C", 0.0),
            ("D", 50.0),
            ("E", 5_000.0),
        ]))
        .unwrap();

        for pair in table.windows(2) {
            assert!(pair[0].trade_value >= pair[1].trade_value);
        }
        assert_eq!(table[0].entity, "E");
        assert_eq!(table[4].entity, "C");
    }

    #[test]
    fn test_ties_broken_by_entity() {
        let table = normalize(rows(&[("Peru", 10.0), ("Chile", 10.0), ("Brazil", 20.0)])).unwrap();
        let order: Vec<_> = table.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(order, vec!["Brazil", "Chile", "Peru"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let values: Vec<(String, f64)> = (1..=150)
            .map(|i| (format!("Country {}", i), (i * i * 1_337) as f64))
            .collect();
        let input = values
            .iter()
            .map(|(e, v)| TradeRecord::new(e.clone(), *v))
            .collect();

        let table = normalize(input).unwrap();
        let sum: f64 = table.iter().filter_map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.02, "sum was {}", sum);

        let small = normalize(rows(&[("A", 1.0), ("B", 1.0), ("C", 1.0)])).unwrap();
        let sum: f64 = small.iter().filter_map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.02, "sum was {}", sum);
        assert_eq!(small[0].percentage, Some(33.34));
        assert_eq!(small[1].percentage, Some(33.33));
    }

    #[test]
    fn test_many_equal_shares_sum_to_hundred() {
        // 220 equal destinations: 0.4545...% each
        let input = (0..220)
            .map(|i| TradeRecord::new(format!("Country {:03}", i), 1_000_000.0))
            .collect();

        let table = normalize(input).unwrap();
        let sum: f64 = table.iter().filter_map(|r| r.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.02, "sum was {}", sum);

        // Leftover hundredths go to the first rows in output order
        assert_eq!(table[0].percentage, Some(0.46));
        assert_eq!(table[219].percentage, Some(0.45));
        assert!(table
            .iter()
            .all(|r| matches!(r.percentage, Some(p) if p == 0.45 || p == 0.46)));
    }

    #[test]
    fn test_zero_rows_kept_and_counted() {
        let table = normalize(rows(&[("A", 100.0), ("B", 0.0)])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[1].percentage, Some(0.0));
        assert_eq!(table[1].log_value, Some(0.0));
        assert_eq!(table[1].display_value.as_deref(), Some("$0.00 M"));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(
            normalize(Vec::new()),
            Err(TransformError::EmptyInput { rows: 0, total: 0.0 })
        );
        assert!(matches!(
            normalize(rows(&[("A", 0.0), ("B", 0.0)])),
            Err(TransformError::EmptyInput { rows: 2, .. })
        ));
    }

    #[test]
    fn test_display_value_threshold() {
        assert_eq!(format_display_value(999_999_999.0).as_deref(), Some("$999.99 M"));
        assert_eq!(format_display_value(1_000_000_000.0).as_deref(), Some("$1.00 B"));
        assert_eq!(format_display_value(290_000.0).as_deref(), Some("$0.29 M"));
        assert_eq!(format_display_value(123_456_789_012.0).as_deref(), Some("$123.45 B"));
        assert_eq!(format_display_value(f64::NAN), None);
    }

    #[test]
    fn test_log_value() {
        assert_eq!(log_value(0.0), Some(0.0));
        assert!(log_value(1.0).unwrap() < log_value(2.0).unwrap());
        assert!(log_value(1e9).unwrap() < log_value(1e9 + 1e3).unwrap());
        assert!((log_value(std::f64::consts::E - 1.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(log_value(-5.0), None);
    }

    #[test]
    fn test_taxonomy_carried_through() {
        let record = TradeRecord::new("Germany", 10.0).with_taxonomy(crate::models::Taxonomy {
            continent: Some("Europe".into()),
            iso3: Some("deu".into()),
            ..Default::default()
        });
        let table = normalize(vec![record]).unwrap();
        assert_eq!(table[0].taxonomy.continent.as_deref(), Some("Europe"));
        assert_eq!(table[0].taxonomy.iso3.as_deref(), Some("deu"));
        assert_eq!(table[0].percentage, Some(100.0));
    }
}
