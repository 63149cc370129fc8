use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. Using `BTreeMap` / `BTreeSet` downstream
/// so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date kept as text; lexicographic order matches date order.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for plotting and range filters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Exact text form used for CSV export; must re-parse to the same value.
    pub fn csv_field(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.clone(),
            CellValue::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnType – declared type of a column, fixed at load time
// ---------------------------------------------------------------------------

/// Column type inferred once when the dataset is built and reused everywhere,
/// instead of re-guessing cell-by-cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Bool,
    Date,
}

impl ColumnType {
    /// Numeric columns are the chartable measures and range-filter targets.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Categorical columns drive grouping, colouring, and value filters.
    /// Bool and Date columns belong to neither partition.
    pub fn is_categorical(self) -> bool {
        matches!(self, ColumnType::Text)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
        };
        write!(f, "{name}")
    }
}

/// A named, typed column of the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table: ordered rows × typed columns, with a pre-computed
/// set of distinct values per column. Immutable after construction; filters
/// produce row-index subsets instead of mutating it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<Column>,
    /// Row-major cells; every row has `columns.len()` entries.
    pub rows: Vec<Vec<CellValue>>,
    /// For each column name the sorted set of distinct values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build a dataset from already-typed cells.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();
        for row in &rows {
            for (col, val) in columns.iter().zip(row) {
                unique_values
                    .entry(col.name.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        Dataset {
            columns,
            rows,
            unique_values,
        }
    }

    /// Build a dataset from raw text fields (the CSV path): infer one type
    /// per column from its cells, then convert every cell to that type.
    pub fn from_text_rows(headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| Column {
                name: name.clone(),
                ty: infer_column_type(&raw_rows, idx),
            })
            .collect();

        let rows: Vec<Vec<CellValue>> = raw_rows
            .iter()
            .map(|raw| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| convert_cell(raw.get(idx).map(String::as_str), col.ty))
                    .collect()
            })
            .collect();

        Dataset::new(columns, rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.ty)
    }

    /// Cell at (row, column name), if both exist.
    pub fn cell(&self, row: usize, name: &str) -> Option<&CellValue> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Schema classifier: numeric partition, in schema order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.ty.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Schema classifier: categorical partition, in schema order.
    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.ty.is_categorical())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Columns usable as a line-chart axis: the name must contain "date".
    pub fn date_like_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.name.to_ascii_lowercase().contains("date"))
            .map(|c| c.name.clone())
            .collect()
    }

    /// All non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row[idx].as_f64())
            .collect()
    }

    /// Numeric values of a column with one entry per row, NaN standing in
    /// for nulls, so columns stay row-aligned for pairwise statistics.
    pub fn aligned_numeric_values(&self, name: &str) -> Vec<f64> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|row| row[idx].as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    /// Number of distinct values in a column (0 for unknown columns).
    pub fn distinct_count(&self, name: &str) -> usize {
        self.unique_values.get(name).map_or(0, BTreeSet::len)
    }
}

// ---------------------------------------------------------------------------
// Column type inference
// ---------------------------------------------------------------------------

/// Infer one type for a column by scanning its non-empty cells.
/// Precedence: bool, integer, float, date, text. A column with no
/// non-empty cells falls back to text.
fn infer_column_type(raw_rows: &[Vec<String>], idx: usize) -> ColumnType {
    let mut seen_any = false;
    let mut all_bool = true;
    let mut all_int = true;
    let mut all_float = true;
    let mut all_date = true;

    for row in raw_rows {
        let Some(field) = row.get(idx) else { continue };
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        seen_any = true;
        all_bool &= field == "true" || field == "false";
        all_int &= field.parse::<i64>().is_ok();
        all_float &= field.parse::<f64>().is_ok();
        all_date &= NaiveDate::parse_from_str(field, "%Y-%m-%d").is_ok();
    }

    if !seen_any {
        ColumnType::Text
    } else if all_bool {
        ColumnType::Bool
    } else if all_int {
        ColumnType::Integer
    } else if all_float {
        ColumnType::Float
    } else if all_date {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn convert_cell(field: Option<&str>, ty: ColumnType) -> CellValue {
    let Some(field) = field.map(str::trim) else {
        return CellValue::Null;
    };
    if field.is_empty() {
        return CellValue::Null;
    }
    match ty {
        ColumnType::Bool => CellValue::Bool(field == "true"),
        ColumnType::Integer => field
            .parse::<i64>()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Null),
        ColumnType::Float => field
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Null),
        ColumnType::Date => CellValue::Date(field.to_string()),
        ColumnType::Text => CellValue::Text(field.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_column_type_inference() {
        let headers = vec![
            "id".to_string(),
            "price".to_string(),
            "label".to_string(),
            "flag".to_string(),
            "when".to_string(),
        ];
        let rows = raw(&[
            &["1", "1.5", "a", "true", "2023-01-01"],
            &["2", "2", "b", "false", "2023-01-02"],
            &["3", "", "c", "true", "2023-01-03"],
        ]);
        let ds = Dataset::from_text_rows(headers, rows);

        assert_eq!(ds.column_type("id"), Some(ColumnType::Integer));
        assert_eq!(ds.column_type("price"), Some(ColumnType::Float));
        assert_eq!(ds.column_type("label"), Some(ColumnType::Text));
        assert_eq!(ds.column_type("flag"), Some(ColumnType::Bool));
        assert_eq!(ds.column_type("when"), Some(ColumnType::Date));
        assert_eq!(ds.cell(2, "price"), Some(&CellValue::Null));
    }

    #[test]
    fn test_classifier_partitions_are_disjoint() {
        let headers = vec![
            "date".to_string(),
            "sales".to_string(),
            "ratio".to_string(),
            "region".to_string(),
            "ok".to_string(),
        ];
        let rows = raw(&[
            &["2023-01-01", "10", "0.5", "North", "true"],
            &["2023-01-02", "20", "1.5", "South", "false"],
        ]);
        let ds = Dataset::from_text_rows(headers, rows);

        let numeric = ds.numeric_columns();
        let categorical = ds.categorical_columns();

        assert_eq!(numeric, vec!["sales".to_string(), "ratio".to_string()]);
        assert_eq!(categorical, vec!["region".to_string()]);
        for col in &numeric {
            assert!(!categorical.contains(col));
        }
        assert!(numeric.len() + categorical.len() <= ds.column_count());
    }

    #[test]
    fn test_unique_values_are_tracked() {
        let headers = vec!["region".to_string()];
        let rows = raw(&[&["North"], &["South"], &["North"]]);
        let ds = Dataset::from_text_rows(headers, rows);

        assert_eq!(ds.distinct_count("region"), 2);
        assert!(ds.unique_values["region"].contains(&CellValue::Text("North".into())));
    }

    #[test]
    fn test_date_like_columns_by_name() {
        let headers = vec!["order_date".to_string(), "sales".to_string()];
        let rows = raw(&[&["2023-01-01", "5"]]);
        let ds = Dataset::from_text_rows(headers, rows);

        assert_eq!(ds.date_like_columns(), vec!["order_date".to_string()]);
    }
}
