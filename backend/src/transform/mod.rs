//! Transformation module.
//!
//! - Normalize: raw rows to a sorted, share-annotated table
//! - Grouper: categories with "Others" collapsing
//! - Reconcile: placeholder rows for map coverage
//! - Companies: the company view
//! - Pipeline: one function per dashboard view

pub mod companies;
pub mod grouper;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;

pub use companies::{CompanyDisplayRow, CompanyTable, ScatterPoint};
pub use grouper::{bucket_by_category, DEFAULT_THRESHOLD};
pub use normalize::{format_display_value, log_value, normalize};
pub use pipeline::*;
pub use reconcile::reconcile_entity_coverage;
