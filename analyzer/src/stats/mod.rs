//! Run statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{CategoryRanking, ConsolidatedTable};

/// Per-category partition size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub chemicals: usize,
}

/// Counts summarizing one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub chemicals: usize,
    pub endpoints: usize,
    /// Chemicals whose NOAEL dose is missing.
    pub missing_noael: usize,
    /// Chemical/endpoint pairs with more than one record. `None` when the
    /// table was read back from an export and the records are unavailable.
    pub conflicts: Option<usize>,
    #[serde(default)]
    pub categories: Vec<CategoryCount>,
}

impl Statistics {
    pub fn collect(table: &ConsolidatedTable, conflicts: Option<usize>) -> Self {
        Self {
            chemicals: table.chemical_count(),
            endpoints: table.endpoint_count(),
            missing_noael: table.missing_noael_count(),
            conflicts,
            categories: Vec::new(),
        }
    }

    pub fn with_rankings(mut self, rankings: &[CategoryRanking]) -> Self {
        self.categories = rankings
            .iter()
            .map(|r| CategoryCount {
                category: r.category.clone(),
                chemicals: r.chemical_count,
            })
            .collect();
        self
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "**********")?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "Number of chemicals: {}", self.chemicals)?;
        writeln!(f, "Number of endpoints: {}", self.endpoints)?;
        writeln!(f, "Number of chemicals with multiple noael values: {}", self.missing_noael)?;
        match self.conflicts {
            Some(n) => writeln!(f, "Number of multiple values for one chemical and endpoint: {}", n)?,
            None => writeln!(f, "Number of multiple values for one chemical and endpoint: unknown")?,
        }
        for category in &self.categories {
            writeln!(f, "{} count: {}", category.category, category.chemicals)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObservationRecord, RecordSet};
    use crate::transform::{consolidate, rank_categories};

    #[test]
    fn test_collect_counts() {
        let records = RecordSet::new(vec![
            ObservationRecord::new("X", "Liver", "Increase").with_noael(1.0, "Category1"),
            ObservationRecord::new("X", "Kidney", "Increase").with_noael(1.0, "Category1"),
            ObservationRecord::new("X", "Kidney", "Decrease").with_noael(1.0, "Category1"),
            ObservationRecord::new("Y", "Liver", "Decrease").with_noael(1.0, "Category1"),
            ObservationRecord::new("Y", "Heart", "Decrease").with_noael(2.0, "Category1"),
        ]);
        let result = consolidate(&records);
        let rankings = rank_categories(&result.table);

        let stats = Statistics::collect(&result.table, Some(result.conflict_count()))
            .with_rankings(&rankings);

        assert_eq!(stats.chemicals, 2);
        assert_eq!(stats.endpoints, 3);
        assert_eq!(stats.missing_noael, 1);
        assert_eq!(stats.conflicts, Some(1));
        assert_eq!(
            stats.categories,
            vec![CategoryCount { category: "Category1".into(), chemicals: 1 }]
        );
    }

    #[test]
    fn test_display_block() {
        let stats = Statistics {
            chemicals: 4,
            endpoints: 7,
            missing_noael: 1,
            conflicts: None,
            categories: vec![],
        };
        let text = stats.to_string();

        assert!(text.starts_with("**********\nStatistics:\n"));
        assert!(text.contains("Number of chemicals: 4"));
        assert!(text.contains("Number of endpoints: 7"));
        assert!(text.contains("chemical and endpoint: unknown"));
    }
}
