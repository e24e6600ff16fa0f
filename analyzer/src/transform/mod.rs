//! Transformation module.
//!
//! This module turns observation records into ranked results:
//! - Pivot: chemical × endpoint direction matrix with conflict detection
//! - Noael: per-chemical NOAEL consistency check
//! - Consolidate: matrix and NOAEL merged into one table
//! - Ranking: per-category endpoint direction rankings
//! - Pipeline: load, transform and persist in one call

pub mod consolidate;
pub mod noael;
pub mod pipeline;
pub mod pivot;
pub mod ranking;

pub use consolidate::{consolidate, Consolidation};
pub use noael::{consolidate_noael, Noael};
pub use pipeline::*;
pub use pivot::{build_pivot, Conflict, PivotMatrix};
pub use ranking::{rank_categories, rank_category};
