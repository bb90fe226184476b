//! Entity coverage for drill-down maps.
//!
//! A drill-down (destinations of one product) returns fewer countries than
//! the reference view (destinations of all products). Maps drawn from the
//! narrower set would simply drop those countries, so they are added back as
//! placeholders: named, but with no value at all.

use std::collections::HashSet;

use crate::models::EnrichedRecord;

/// Append a placeholder for every `full_set` entity missing from `subset`.
///
/// `subset` records are kept as-is and come first. Placeholders follow in
/// `full_set` order. Running it again on its own output inserts nothing.
pub fn reconcile_entity_coverage(
    subset: Vec<EnrichedRecord>,
    full_set: &[EnrichedRecord],
) -> Vec<EnrichedRecord> {
    let mut seen: HashSet<String> = subset.iter().map(|r| r.entity.clone()).collect();
    let mut output = subset;

    for record in full_set {
        if seen.insert(record.entity.clone()) {
            output.push(EnrichedRecord::placeholder(record.entity.clone()));
        }
    }

    output
}
