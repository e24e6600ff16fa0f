//! Domain models for the noael-rank pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`ObservationRecord`] - One chemical/endpoint/study observation
//! - [`RecordSet`] - Immutable view over the loaded observations
//! - [`ConsolidatedTable`] - Chemical × endpoint direction matrix with per-chemical NOAEL
//! - [`CategoryRanking`] - Ranked endpoint directions for one NOAEL category
//! - [`Direction`] - Increase / Decrease label of a ranking row

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Cell value counted as an increase.
pub const INCREASE_LABEL: &str = "Increase";

/// Cell value counted as a decrease.
pub const DECREASE_LABEL: &str = "Decrease";

// =============================================================================
// Observation Records
// =============================================================================

/// A single observation row, reduced to the fields the core consumes.
///
/// Every field is optional: a row may simply lack a value. A record without a
/// chemical name or endpoint never matches a matrix cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub chemical_name: Option<String>,
    pub endpoint: Option<String>,
    pub direction: Option<String>,
    pub noael_dose: Option<f64>,
    pub noael_category: Option<String>,
}

impl ObservationRecord {
    /// Create a record with chemical, endpoint and direction and no NOAEL.
    pub fn new(
        chemical_name: impl Into<String>,
        endpoint: impl Into<String>,
        direction: impl Into<String>,
    ) -> Self {
        Self {
            chemical_name: Some(chemical_name.into()),
            endpoint: Some(endpoint.into()),
            direction: Some(direction.into()),
            noael_dose: None,
            noael_category: None,
        }
    }

    /// Set the NOAEL dose and category.
    pub fn with_noael(mut self, dose: f64, category: impl Into<String>) -> Self {
        self.noael_dose = Some(dose);
        self.noael_category = Some(category.into());
        self
    }

    /// Chemical and endpoint, if both are present.
    pub fn match_key(&self) -> Option<(&str, &str)> {
        Some((self.chemical_name.as_deref()?, self.endpoint.as_deref()?))
    }
}

/// Immutable view over the loaded observation records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<ObservationRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<ObservationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<ObservationRecord>> for RecordSet {
    fn from(records: Vec<ObservationRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<ObservationRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = ObservationRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a ObservationRecord;
    type IntoIter = std::slice::Iter<'a, ObservationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Consolidated Table
// =============================================================================

/// One chemical's row of the consolidated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRow {
    pub chemical_name: String,
    /// One cell per endpoint column, in column order. `None` is absent.
    pub cells: Vec<Option<String>>,
    pub noael_dose: Option<f64>,
    pub noael_category: Option<String>,
}

impl ConsolidatedRow {
    /// True when the NOAEL dose is missing (inconsistent or never reported).
    pub fn is_noael_missing(&self) -> bool {
        self.noael_dose.is_none()
    }
}

/// Chemical × endpoint matrix plus the consolidated NOAEL of each chemical.
///
/// Rows are sorted by chemical name and columns by endpoint name, both unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedTable {
    endpoints: Vec<String>,
    rows: Vec<ConsolidatedRow>,
}

impl ConsolidatedTable {
    /// Build a table from already ordered parts.
    ///
    /// Callers keep `endpoints` and row names sorted and unique, and every row
    /// holds exactly one cell per endpoint.
    pub fn from_parts(endpoints: Vec<String>, rows: Vec<ConsolidatedRow>) -> Self {
        debug_assert!(rows.iter().all(|r| r.cells.len() == endpoints.len()));
        Self { endpoints, rows }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn rows(&self) -> &[ConsolidatedRow] {
        &self.rows
    }

    pub fn chemicals(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.chemical_name.as_str())
    }

    pub fn chemical_count(&self) -> usize {
        self.rows.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    pub fn row(&self, chemical: &str) -> Option<&ConsolidatedRow> {
        self.rows
            .binary_search_by(|r| r.chemical_name.as_str().cmp(chemical))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Direction recorded for a chemical and endpoint, `None` when absent.
    pub fn cell(&self, chemical: &str, endpoint: &str) -> Option<&str> {
        let column = self
            .endpoints
            .binary_search_by(|e| e.as_str().cmp(endpoint))
            .ok()?;
        self.row(chemical)?.cells[column].as_deref()
    }

    /// Number of chemicals whose NOAEL dose is missing.
    pub fn missing_noael_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_noael_missing()).count()
    }
}

// =============================================================================
// Category Rankings
// =============================================================================

/// Direction label of a ranking row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Increase => INCREASE_LABEL,
            Self::Decrease => DECREASE_LABEL,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Ordered by label text so sorting matches plain string ordering.
impl Ord for Direction {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label().cmp(other.label())
    }
}

impl PartialOrd for Direction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Count of one direction for one endpoint within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRankingRow {
    pub count: usize,
    #[serde(rename = "total_values_for_endpoint")]
    pub total_valid: usize,
    pub endpoint: String,
    pub direction: Direction,
}

impl CategoryRankingRow {
    /// Tuple the ranking is sorted on, compared field by field.
    pub fn sort_key(&self) -> (usize, usize, &str, Direction) {
        (self.count, self.total_valid, self.endpoint.as_str(), self.direction)
    }
}

/// Ranked rows for one NOAEL category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRanking {
    pub category: String,
    /// Chemicals in the category partition.
    pub chemical_count: usize,
    pub rows: Vec<CategoryRankingRow>,
}
