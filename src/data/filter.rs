use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dataset};

/// At most this many columns of each kind get filter widgets, to bound UI
/// clutter. Fixed policy, not configurable.
pub const MAX_FILTER_COLUMNS: usize = 3;

/// Categorical columns with more distinct values than this are silently
/// excluded from filtering.
pub const MAX_CATEGORY_VALUES: usize = 10;

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Inclusive numeric bounds as currently set in the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

/// Per-column filter selections, rebuilt from defaults whenever the active
/// dataset changes. Only eligible columns (see [`categorical_filter_columns`]
/// and [`numeric_filter_columns`]) ever have entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// column name → set of selected categorical values.
    pub selected: BTreeMap<String, BTreeSet<CellValue>>,
    /// column name → user-entered [min, max] range.
    pub ranges: BTreeMap<String, NumericRange>,
}

impl FilterState {
    /// Initialise with every filter at its inactive default: all values
    /// selected, ranges at the column's true bounds.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let mut state = FilterState::default();
        for col in categorical_filter_columns(dataset) {
            let all = dataset
                .unique_values
                .get(&col)
                .cloned()
                .unwrap_or_default();
            state.selected.insert(col, all);
        }
        for col in numeric_filter_columns(dataset) {
            if let Some((min, max)) = column_bounds(dataset, &col) {
                state.ranges.insert(col, NumericRange { min, max });
            }
        }
        state
    }
}

// ---------------------------------------------------------------------------
// Filter eligibility
// ---------------------------------------------------------------------------

/// Categorical columns that get a multi-select: the first
/// [`MAX_FILTER_COLUMNS`] with at most [`MAX_CATEGORY_VALUES`] distinct
/// values. Columns over the value cap are skipped, not errors.
pub fn categorical_filter_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .categorical_columns()
        .into_iter()
        .take(MAX_FILTER_COLUMNS)
        .filter(|col| dataset.distinct_count(col) <= MAX_CATEGORY_VALUES)
        .collect()
}

/// Numeric columns that get a range input: the first [`MAX_FILTER_COLUMNS`].
pub fn numeric_filter_columns(dataset: &Dataset) -> Vec<String> {
    dataset
        .numeric_columns()
        .into_iter()
        .take(MAX_FILTER_COLUMNS)
        .collect()
}

/// True min/max of a numeric column, ignoring nulls.
pub fn column_bounds(dataset: &Dataset, column: &str) -> Option<(f64, f64)> {
    let values = dataset.numeric_values(column);
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

// ---------------------------------------------------------------------------
// Active-filter policy
// ---------------------------------------------------------------------------

/// A categorical filter is active only when the selection is a strict,
/// non-empty subset of the column's distinct values. Selecting everything is
/// the default "show all"; selecting nothing is deliberately treated the same
/// way rather than as "exclude every row".
pub fn is_categorical_active(
    dataset: &Dataset,
    column: &str,
    selected: &BTreeSet<CellValue>,
) -> bool {
    if selected.is_empty() {
        return false;
    }
    match dataset.unique_values.get(column) {
        Some(all) => selected.len() < all.len(),
        None => false,
    }
}

/// A numeric filter is active only when the user narrowed either bound past
/// the column's true extent.
pub fn is_numeric_active(dataset: &Dataset, column: &str, range: NumericRange) -> bool {
    match column_bounds(dataset, column) {
        Some((min, max)) => range.min > min || range.max < max,
        None => false,
    }
}

/// True when any filter in `filters` is active for `dataset`.
pub fn any_filter_active(dataset: &Dataset, filters: &FilterState) -> bool {
    filters
        .selected
        .iter()
        .any(|(col, sel)| is_categorical_active(dataset, col, sel))
        || filters
            .ranges
            .iter()
            .any(|(col, range)| is_numeric_active(dataset, col, *range))
}

// ---------------------------------------------------------------------------
// Conjunctive application
// ---------------------------------------------------------------------------

/// Return indices of rows passing the conjunction of all active filters, in
/// original row order. With no active filter this is exactly `0..len`.
///
/// A row passes an active categorical filter when its value is in the
/// selected set, and an active numeric filter when its value lies inside the
/// inclusive range; null or non-numeric cells fail an active range filter.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    struct CatPredicate<'a> {
        col_idx: usize,
        selected: &'a BTreeSet<CellValue>,
    }
    struct NumPredicate {
        col_idx: usize,
        range: NumericRange,
    }

    let cat_predicates: Vec<CatPredicate> = filters
        .selected
        .iter()
        .filter(|(col, sel)| is_categorical_active(dataset, col, sel))
        .filter_map(|(col, sel)| {
            Some(CatPredicate {
                col_idx: dataset.column_index(col)?,
                selected: sel,
            })
        })
        .collect();

    let num_predicates: Vec<NumPredicate> = filters
        .ranges
        .iter()
        .filter(|(col, range)| is_numeric_active(dataset, col, **range))
        .filter_map(|(col, range)| {
            Some(NumPredicate {
                col_idx: dataset.column_index(col)?,
                range: *range,
            })
        })
        .collect();

    dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            cat_predicates
                .iter()
                .all(|p| p.selected.contains(&row[p.col_idx]))
                && num_predicates.iter().all(|p| match row[p.col_idx].as_f64() {
                    Some(v) => v >= p.range.min && v <= p.range.max,
                    None => false,
                })
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::demo::demo_dataset;
    use crate::data::model::{Column, ColumnType};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn small_dataset() -> Dataset {
        let columns = vec![
            Column {
                name: "region".to_string(),
                ty: ColumnType::Text,
            },
            Column {
                name: "sales".to_string(),
                ty: ColumnType::Integer,
            },
        ];
        let rows = vec![
            vec![text("North"), CellValue::Integer(10)],
            vec![text("South"), CellValue::Integer(50)],
            vec![text("East"), CellValue::Integer(90)],
            vec![text("North"), CellValue::Integer(70)],
        ];
        Dataset::new(columns, rows)
    }

    #[test]
    fn test_no_filter_is_identity() {
        let ds = small_dataset();
        let filters = FilterState::for_dataset(&ds);
        assert!(!any_filter_active(&ds, &filters));
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_full_selection_is_inactive() {
        let ds = small_dataset();
        let filters = FilterState::for_dataset(&ds);
        // Default selection is the full distinct set.
        let sel = &filters.selected["region"];
        assert!(!is_categorical_active(&ds, "region", sel));
        assert_eq!(filtered_indices(&ds, &filters).len(), ds.len());
    }

    #[test]
    fn test_empty_selection_means_no_filter() {
        let ds = small_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters.selected.insert("region".to_string(), BTreeSet::new());
        assert!(!any_filter_active(&ds, &filters));
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_strict_subset_keeps_matching_rows() {
        let ds = small_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters
            .selected
            .insert("region".to_string(), BTreeSet::from([text("North")]));
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 3]);
    }

    #[test]
    fn test_numeric_bounds_at_true_extent_are_inactive() {
        let ds = small_dataset();
        let filters = FilterState::for_dataset(&ds);
        let range = filters.ranges["sales"];
        assert_eq!((range.min, range.max), (10.0, 90.0));
        assert!(!is_numeric_active(&ds, "sales", range));
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let ds = small_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters.ranges.insert(
            "sales".to_string(),
            NumericRange {
                min: 50.0,
                max: 70.0,
            },
        );
        let kept = filtered_indices(&ds, &filters);
        assert_eq!(kept, vec![1, 3]);
        for &i in &kept {
            let v = ds.rows[i][1].as_f64().unwrap();
            assert!((50.0..=70.0).contains(&v));
        }
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let ds = small_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters
            .selected
            .insert("region".to_string(), BTreeSet::from([text("North")]));
        filters.ranges.insert(
            "sales".to_string(),
            NumericRange {
                min: 10.0,
                max: 70.0,
            },
        );

        let once = filtered_indices(&ds, &filters);
        // Re-applying the same predicates to the surviving rows keeps them all.
        let survivors = Dataset::new(
            ds.columns.clone(),
            once.iter().map(|&i| ds.rows[i].clone()).collect(),
        );
        let twice = filtered_indices(&survivors, &filters);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_high_cardinality_column_is_excluded() {
        let columns = vec![Column {
            name: "id".to_string(),
            ty: ColumnType::Text,
        }];
        let rows: Vec<Vec<CellValue>> = (0..20).map(|i| vec![text(&format!("id-{i}"))]).collect();
        let ds = Dataset::new(columns, rows);
        assert!(categorical_filter_columns(&ds).is_empty());
    }

    #[test]
    fn test_column_caps() {
        let columns: Vec<Column> = (0..5)
            .map(|i| Column {
                name: format!("n{i}"),
                ty: ColumnType::Integer,
            })
            .chain((0..5).map(|i| Column {
                name: format!("c{i}"),
                ty: ColumnType::Text,
            }))
            .collect();
        let rows = vec![
            (0..5)
                .map(CellValue::Integer)
                .chain((0..5).map(|i| text(&format!("v{i}"))))
                .collect::<Vec<_>>(),
        ];
        let ds = Dataset::new(columns, rows);
        assert_eq!(numeric_filter_columns(&ds).len(), MAX_FILTER_COLUMNS);
        assert_eq!(categorical_filter_columns(&ds).len(), MAX_FILTER_COLUMNS);
    }

    #[test]
    fn test_demo_region_and_sales_conjunction() {
        let ds = demo_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters.selected.insert(
            "region".to_string(),
            BTreeSet::from([text("North"), text("South")]),
        );
        filters.ranges.insert(
            "sales".to_string(),
            NumericRange {
                min: 50.0,
                max: 100.0,
            },
        );

        let kept = filtered_indices(&ds, &filters);
        assert!(!kept.is_empty());
        assert!(kept.len() < ds.len());
        for &i in &kept {
            let region = ds.cell(i, "region").unwrap();
            assert!(region == &text("North") || region == &text("South"));
            let sales = ds.cell(i, "sales").unwrap().as_f64().unwrap();
            assert!((50.0..=100.0).contains(&sales));
        }
    }
}
