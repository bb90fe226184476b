//! Collapse enriched records into top-level categories.
//!
//! This is what the sector bar and pie charts are drawn from: shares are
//! summed per category, and categories too small to read are folded into a
//! single "Others" row.
//!
//! ```text
//! Records (HS4 level)                 →  Buckets (section level)
//! ┌─────────────────────────────┐       ┌────────────────────────┐
//! │ Machines / Computers  20.0% │       │ Machines        35.0%  │
//! │ Machines / Chips      15.0% │  →    │ Vehicles        64.2%  │
//! │ Vehicles / Cars       64.2% │       │ Others           0.8%  │
//! │ Textiles / Silk        0.5% │       └────────────────────────┘
//! │ Wood / Furniture       0.3% │
//! └─────────────────────────────┘
//! ```

use std::collections::HashMap;

use super::normalize::round2;
use crate::error::{TransformError, TransformResult};
use crate::models::{BucketedRecord, EnrichedRecord, OTHERS_LABEL, UNCLASSIFIED_LABEL};

/// Default share, in percent, below which a category becomes "Others".
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Group records by top-level category, folding small categories into "Others".
///
/// Categories whose summed share is strictly below `threshold` are merged.
/// Placeholder records carry no share and are skipped. Rows come back sorted
/// by share, largest first; callers should not rely on that order.
pub fn bucket_by_category(
    records: &[EnrichedRecord],
    threshold: f64,
) -> TransformResult<Vec<BucketedRecord>> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(TransformError::InvalidThreshold(threshold));
    }

    // Pass 1: sum per category, in first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, BucketBuilder> = HashMap::new();

    for record in records {
        let Some(percentage) = record.percentage else {
            continue;
        };
        let label = record.taxonomy.top_level().unwrap_or(UNCLASSIFIED_LABEL);
        let builder = groups.entry(label.to_string()).or_insert_with(|| {
            order.push(label.to_string());
            BucketBuilder::default()
        });
        builder.add(percentage, record.trade_value.unwrap_or(0.0), 1);
    }

    // Pass 2: relabel small groups and merge rows sharing a label
    let mut merged: HashMap<String, BucketBuilder> = HashMap::new();
    let mut merged_order: Vec<String> = Vec::new();

    for label in order {
        let Some(group) = groups.remove(&label) else {
            continue;
        };
        let target = if group.percentage < threshold {
            OTHERS_LABEL.to_string()
        } else {
            label
        };
        let builder = merged.entry(target.clone()).or_insert_with(|| {
            merged_order.push(target);
            BucketBuilder::default()
        });
        builder.add(group.percentage, group.trade_value, group.members);
    }

    let mut buckets: Vec<BucketedRecord> = merged_order
        .into_iter()
        .filter_map(|label| merged.remove(&label).map(|b| b.build(label)))
        .collect();

    buckets.sort_by(|a, b| {
        b.percentage
            .total_cmp(&a.percentage)
            .then_with(|| a.label.cmp(&b.label))
    });

    Ok(buckets)
}

/// Running sums for one bucket.
#[derive(Default)]
struct BucketBuilder {
    percentage: f64,
    trade_value: f64,
    members: usize,
}

impl BucketBuilder {
    fn add(&mut self, percentage: f64, trade_value: f64, members: usize) {
        self.percentage += percentage;
        self.trade_value += trade_value;
        self.members += members;
    }

    fn build(self, label: String) -> BucketedRecord {
        BucketedRecord {
            label,
            percentage: round2(self.percentage),
            trade_value: self.trade_value,
            members: self.members,
        }
    }
}
