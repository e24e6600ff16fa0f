//! Merge the direction matrix and per-chemical NOAEL into one table.

use crate::models::{ConsolidatedRow, ConsolidatedTable, RecordSet};

use super::noael::consolidate_noael;
use super::pivot::{build_pivot, Conflict};

/// Consolidated table plus the conflicts found while pivoting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consolidation {
    pub table: ConsolidatedTable,
    pub conflicts: Vec<Conflict>,
}

impl Consolidation {
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Build the consolidated table from a record set.
pub fn consolidate(records: &RecordSet) -> Consolidation {
    let pivot = build_pivot(records);
    let noael = consolidate_noael(records, &pivot.chemicals);

    let rows = pivot
        .chemicals
        .into_iter()
        .zip(pivot.cells)
        .zip(noael)
        .map(|((chemical_name, cells), noael)| ConsolidatedRow {
            chemical_name,
            cells,
            noael_dose: noael.dose,
            noael_category: noael.category,
        })
        .collect();

    Consolidation {
        table: ConsolidatedTable::from_parts(pivot.endpoints, rows),
        conflicts: pivot.conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObservationRecord;

    #[test]
    fn test_cells_and_noael_merged_per_chemical() {
        let records = RecordSet::new(vec![
            ObservationRecord::new("X", "Liver", "Increase").with_noael(10.0, "Category2"),
            ObservationRecord::new("X", "Kidney", "Decrease").with_noael(10.0, "Category2"),
            ObservationRecord::new("X", "Kidney", "Increase").with_noael(10.0, "Category2"),
            ObservationRecord::new("Y", "Liver", "Decrease").with_noael(3.0, "Category1"),
            ObservationRecord::new("Y", "Liver", "Decrease").with_noael(4.0, "Category1"),
        ]);

        let result = consolidate(&records);
        let table = &result.table;

        assert_eq!(table.endpoints(), ["Kidney", "Liver"]);
        assert_eq!(table.chemicals().collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(table.cell("X", "Liver"), Some("Increase"));
        assert_eq!(table.cell("X", "Kidney"), None);
        assert_eq!(table.cell("Y", "Liver"), None);
        assert_eq!(result.conflict_count(), 2);

        let x = table.row("X").unwrap();
        assert_eq!(x.noael_dose, Some(10.0));
        assert_eq!(x.noael_category.as_deref(), Some("Category2"));

        let y = table.row("Y").unwrap();
        assert!(y.is_noael_missing());
        assert_eq!(y.noael_category, None);
    }

    #[test]
    fn test_consolidation_is_deterministic() {
        let records = RecordSet::new(vec![
            ObservationRecord::new("B", "Liver", "Increase").with_noael(1.0, "Category1"),
            ObservationRecord::new("A", "Heart", "Decrease").with_noael(2.0, "Category2"),
            ObservationRecord::new("A", "Liver", "Increase").with_noael(2.0, "Category2"),
        ]);

        assert_eq!(consolidate(&records), consolidate(&records));
    }
}
