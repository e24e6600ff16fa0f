//! Rank endpoint directions within each NOAEL category.
//!
//! Chemicals are partitioned by consolidated category. For every endpoint the
//! number of "Increase" and "Decrease" cells in the partition is counted, and
//! the resulting rows are sorted in reverse order of
//! `(count, total_valid, endpoint, direction)`.
//!
//! Chemicals without a category are left out of every partition.

use std::collections::BTreeMap;

use crate::models::{
    CategoryRanking, CategoryRankingRow, ConsolidatedRow, ConsolidatedTable, Direction,
    DECREASE_LABEL, INCREASE_LABEL,
};

/// Rank every non-missing category of the table, in ascending category order.
pub fn rank_categories(table: &ConsolidatedTable) -> Vec<CategoryRanking> {
    let mut partitions: BTreeMap<&str, Vec<&ConsolidatedRow>> = BTreeMap::new();
    for row in table.rows() {
        match row.noael_category.as_deref() {
            Some(category) if !category.is_empty() => {
                partitions.entry(category).or_default().push(row)
            }
            _ => {}
        }
    }

    partitions
        .into_iter()
        .map(|(category, rows)| rank_category(category, table.endpoints(), &rows))
        .collect()
}

/// Rank the endpoints of one category partition.
///
/// `rows` must carry one cell per entry of `endpoints`.
pub fn rank_category(
    category: &str,
    endpoints: &[String],
    rows: &[&ConsolidatedRow],
) -> CategoryRanking {
    let mut ranked = Vec::with_capacity(endpoints.len() * 2);

    for (column, endpoint) in endpoints.iter().enumerate() {
        let (increase, decrease) =
            rows.iter()
                .fold((0, 0), |(inc, dec), row| match row.cells[column].as_deref() {
                    Some(INCREASE_LABEL) => (inc + 1, dec),
                    Some(DECREASE_LABEL) => (inc, dec + 1),
                    _ => (inc, dec),
                });
        let total_valid = increase + decrease;

        ranked.push(CategoryRankingRow {
            count: increase,
            total_valid,
            endpoint: endpoint.clone(),
            direction: Direction::Increase,
        });
        ranked.push(CategoryRankingRow {
            count: decrease,
            total_valid,
            endpoint: endpoint.clone(),
            direction: Direction::Decrease,
        });
    }

    ranked.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));

    CategoryRanking {
        category: category.to_string(),
        chemical_count: rows.len(),
        rows: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, cells: &[Option<&str>], category: Option<&str>) -> ConsolidatedRow {
        ConsolidatedRow {
            chemical_name: name.to_string(),
            cells: cells.iter().map(|c| c.map(String::from)).collect(),
            noael_dose: category.map(|_| 1.0),
            noael_category: category.map(String::from),
        }
    }

    fn tuple(r: &CategoryRankingRow) -> (usize, usize, &str, &str) {
        (r.count, r.total_valid, r.endpoint.as_str(), r.direction.label())
    }

    #[test]
    fn test_equal_counts_ordered_by_total_then_name_then_direction() {
        let inc = Some("Increase");
        let dec = Some("Decrease");
        let endpoints = vec!["A".to_string(), "B".to_string()];
        let rows = vec![
            row("c1", &[inc, inc], Some("Cat")),
            row("c2", &[inc, inc], Some("Cat")),
            row("c3", &[inc, inc], Some("Cat")),
            row("c4", &[dec, dec], Some("Cat")),
            row("c5", &[None, dec], Some("Cat")),
            row("c6", &[None, dec], Some("Cat")),
        ];
        let table = ConsolidatedTable::from_parts(endpoints, rows);

        let rankings = rank_categories(&table);

        assert_eq!(rankings.len(), 1);
        let order: Vec<_> = rankings[0].rows.iter().map(tuple).collect();
        assert_eq!(
            order,
            vec![
                (3, 6, "B", "Increase"),
                (3, 6, "B", "Decrease"),
                (3, 4, "A", "Increase"),
                (1, 4, "A", "Decrease"),
            ]
        );
    }

    #[test]
    fn test_opposite_directions_in_one_category() {
        let table = ConsolidatedTable::from_parts(
            vec!["Endpoint1".to_string()],
            vec![
                row("c1", &[Some("Increase")], Some("Category2")),
                row("c2", &[Some("Decrease")], Some("Category2")),
            ],
        );

        let rankings = rank_categories(&table);

        assert_eq!(rankings[0].category, "Category2");
        assert_eq!(rankings[0].chemical_count, 2);
        let order: Vec<_> = rankings[0].rows.iter().map(tuple).collect();
        assert_eq!(
            order,
            vec![(1, 2, "Endpoint1", "Increase"), (1, 2, "Endpoint1", "Decrease")]
        );
    }

    #[test]
    fn test_missing_category_excluded_everywhere() {
        let table = ConsolidatedTable::from_parts(
            vec!["Liver".to_string()],
            vec![
                row("c1", &[Some("Increase")], Some("Category1")),
                row("c2", &[Some("Increase")], None),
                row("c3", &[Some("Decrease")], None),
            ],
        );

        let rankings = rank_categories(&table);

        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].chemical_count, 1);
        let order: Vec<_> = rankings[0].rows.iter().map(tuple).collect();
        assert_eq!(order, vec![(1, 1, "Liver", "Increase"), (0, 1, "Liver", "Decrease")]);
    }

    #[test]
    fn test_other_values_ignored() {
        let table = ConsolidatedTable::from_parts(
            vec!["Liver".to_string()],
            vec![
                row("c1", &[Some("increase")], Some("Category1")),
                row("c2", &[Some("Equivocal")], Some("Category1")),
                row("c3", &[None], Some("Category1")),
            ],
        );

        let rankings = rank_categories(&table);
        let order: Vec<_> = rankings[0].rows.iter().map(tuple).collect();

        assert_eq!(order, vec![(0, 0, "Liver", "Increase"), (0, 0, "Liver", "Decrease")]);
    }

    #[test]
    fn test_categories_ranked_independently_in_order() {
        let table = ConsolidatedTable::from_parts(
            vec!["Liver".to_string()],
            vec![
                row("c1", &[Some("Decrease")], Some("Category3")),
                row("c2", &[Some("Increase")], Some("Category1")),
            ],
        );

        let rankings = rank_categories(&table);

        let names: Vec<_> = rankings.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Category1", "Category3"]);
        assert_eq!(rankings[1].rows[0].direction, Direction::Decrease);
        assert_eq!(rankings[1].rows[0].count, 1);
    }

    #[test]
    fn test_table_without_endpoints_gives_empty_rankings() {
        let table = ConsolidatedTable::from_parts(vec![], vec![row("c1", &[], Some("Category1"))]);

        let rankings = rank_categories(&table);

        assert_eq!(rankings.len(), 1);
        assert!(rankings[0].rows.is_empty());
    }
}
