//! Per-chemical NOAEL consolidation.
//!
//! A chemical keeps its NOAEL dose and category only when every one of its
//! records agrees on both. Any disagreement, across any endpoint, leaves both
//! fields missing. An absent value counts as a distinct value of its own.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::RecordSet;

/// Consolidated NOAEL of one chemical.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Noael {
    pub dose: Option<f64>,
    pub category: Option<String>,
}

impl Noael {
    /// Both fields missing.
    pub fn missing() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct Distinct<'a> {
    doses: BTreeSet<Option<u64>>,
    categories: BTreeSet<Option<&'a str>>,
}

// Bit pattern used for set membership; folds -0.0 into 0.0.
fn dose_key(dose: Option<f64>) -> Option<u64> {
    dose.map(|d| if d == 0.0 { 0.0f64.to_bits() } else { d.to_bits() })
}

/// Consolidate the NOAEL of each chemical, in the order given by `chemicals`.
pub fn consolidate_noael(records: &RecordSet, chemicals: &[String]) -> Vec<Noael> {
    let mut seen: BTreeMap<&str, Distinct<'_>> = BTreeMap::new();
    for record in records {
        let Some(chemical) = record.chemical_name.as_deref() else {
            continue;
        };
        let distinct = seen.entry(chemical).or_default();
        distinct.doses.insert(dose_key(record.noael_dose));
        distinct.categories.insert(record.noael_category.as_deref());
    }

    chemicals
        .iter()
        .map(|chemical| match seen.get(chemical.as_str()) {
            Some(d) if d.doses.len() == 1 && d.categories.len() == 1 => {
                let dose = d.doses.iter().next().copied().flatten();
                let category = d.categories.iter().next().copied().flatten();
                Noael {
                    dose: dose.map(f64::from_bits),
                    category: category.map(String::from),
                }
            }
            Some(d) => {
                tracing::debug!(
                    chemical = chemical.as_str(),
                    doses = d.doses.len(),
                    categories = d.categories.len(),
                    "inconsistent NOAEL values"
                );
                Noael::missing()
            }
            None => Noael::missing(),
        })
        .collect()
}
