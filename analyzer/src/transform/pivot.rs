//! Pivot flat observation records into the chemical × endpoint direction matrix.
//!
//! # Architecture
//!
//! ```text
//! Records (flat rows)                    →  Matrix (one row per chemical)
//! ┌──────────────────────────────────┐     ┌──────────┬──────────┬──────────┐
//! │ X, Liver,  Increase              │     │          │ Kidney   │ Liver    │
//! │ X, Kidney, Decrease              │  →  ├──────────┼──────────┼──────────┤
//! │ X, Kidney, Increase  (conflict)  │     │ X        │ (absent) │ Increase │
//! │ Y, Kidney, Decrease              │     │ Y        │ Decrease │ (absent) │
//! └──────────────────────────────────┘     └──────────┴──────────┴──────────┘
//! ```
//!
//! A cell holds a direction only when exactly one record matched it. Pairs
//! matched by several records are left absent and reported as [`Conflict`]s.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::RecordSet;

/// A chemical/endpoint pair matched by more than one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub chemical_name: String,
    pub endpoint: String,
    /// Number of records that matched the pair (always at least 2).
    pub matches: usize,
}

/// Direction matrix built by [`build_pivot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotMatrix {
    /// Distinct chemical names, ascending.
    pub chemicals: Vec<String>,
    /// Distinct endpoints, ascending.
    pub endpoints: Vec<String>,
    /// One row per chemical, one cell per endpoint.
    pub cells: Vec<Vec<Option<String>>>,
    /// Conflicting pairs in row-major order.
    pub conflicts: Vec<Conflict>,
}

impl PivotMatrix {
    /// Number of pairs that had more than one matching record.
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

#[derive(Clone, Copy)]
enum Matched<'a> {
    One(Option<&'a str>),
    Many(usize),
}

/// Build the direction matrix from a record set.
pub fn build_pivot(records: &RecordSet) -> PivotMatrix {
    let chemicals: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.chemical_name.as_deref())
        .collect();
    let endpoints: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.endpoint.as_deref())
        .collect();

    let mut matched: BTreeMap<(&str, &str), Matched<'_>> = BTreeMap::new();
    for record in records {
        let Some(key) = record.match_key() else {
            continue;
        };
        matched
            .entry(key)
            .and_modify(|m| {
                *m = match *m {
                    Matched::One(_) => Matched::Many(2),
                    Matched::Many(n) => Matched::Many(n + 1),
                }
            })
            .or_insert(Matched::One(record.direction.as_deref()));
    }

    let mut cells = Vec::with_capacity(chemicals.len());
    let mut conflicts = Vec::new();

    for &chemical in &chemicals {
        let mut row = Vec::with_capacity(endpoints.len());
        for &endpoint in &endpoints {
            let cell = match matched.get(&(chemical, endpoint)) {
                None => None,
                Some(Matched::One(direction)) => direction.map(str::to_string),
                Some(Matched::Many(n)) => {
                    tracing::debug!(chemical, endpoint, matches = n, "conflicting observations");
                    conflicts.push(Conflict {
                        chemical_name: chemical.to_string(),
                        endpoint: endpoint.to_string(),
                        matches: *n,
                    });
                    None
                }
            };
            row.push(cell);
        }
        cells.push(row);
    }

    PivotMatrix {
        chemicals: chemicals.into_iter().map(String::from).collect(),
        endpoints: endpoints.into_iter().map(String::from).collect(),
        cells,
        conflicts,
    }
}
