use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnType, Dataset};
use super::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited text with a header row (primary format)
/// * `.json`    – records-oriented array of flat objects
/// * `.parquet` – scalar columns (strings, ints, floats, bools, dates)
pub fn load_file(path: &Path) -> Result<Dataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)?;
            load_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path)?;
            load_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row. Column types are inferred from
/// the cells after reading; empty fields become nulls.
pub fn load_csv<R: Read>(input: R) -> Result<Dataset, DataError> {
    let mut reader = csv::Reader::from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(DataError::Malformed("file has no header row".to_string()));
    }

    let mut raw_rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        raw_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    Ok(Dataset::from_text_rows(headers, raw_rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "date": "2023-01-01", "sales": 42, "region": "North" },
///   ...
/// ]
/// ```
///
/// Scalars are flattened to text and run through the same column type
/// inference as CSV, so `.csv` and `.json` renditions of a table produce
/// the same schema.
pub fn load_json(text: &str) -> Result<Dataset, DataError> {
    let root: JsonValue = serde_json::from_str(text)?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::Malformed("expected top-level JSON array".to_string()))?;

    // Union of keys across all records, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for rec in records {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::Malformed("expected JSON records to be objects".to_string()))?;
        for key in obj.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        return Err(DataError::Malformed("JSON records have no fields".to_string()));
    }

    let mut raw_rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        // Every record was checked to be an object while collecting headers.
        let Some(obj) = rec.as_object() else { continue };
        let mut row = Vec::with_capacity(headers.len());
        for key in &headers {
            row.push(match obj.get(key) {
                None | Some(JsonValue::Null) => String::new(),
                Some(JsonValue::String(s)) => s.clone(),
                Some(JsonValue::Number(n)) => n.to_string(),
                Some(JsonValue::Bool(b)) => b.to_string(),
                Some(other) => {
                    return Err(DataError::Malformed(format!(
                        "row {i}, field '{key}': expected a scalar, got {other}"
                    )))
                }
            });
        }
        raw_rows.push(row);
    }

    Ok(Dataset::from_text_rows(headers, raw_rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns. Arrow types carry the schema, so
/// no inference pass is needed. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset, DataError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let mut columns: Option<Vec<Column>> = None;
    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();

        if columns.is_none() {
            columns = Some(
                schema
                    .fields()
                    .iter()
                    .map(|f| Column {
                        name: f.name().clone(),
                        ty: arrow_column_type(f.data_type()),
                    })
                    .collect(),
            );
        }

        for row in 0..batch.num_rows() {
            let cells: Vec<CellValue> = (0..batch.num_columns())
                .map(|col| extract_cell(batch.column(col), row))
                .collect();
            rows.push(cells);
        }
    }

    let columns =
        columns.ok_or_else(|| DataError::Malformed("parquet file has no columns".to_string()))?;
    Ok(Dataset::new(columns, rows))
}

fn arrow_column_type(dt: &DataType) -> ColumnType {
    match dt {
        DataType::Int32 | DataType::Int64 => ColumnType::Integer,
        DataType::Float32 | DataType::Float64 => ColumnType::Float,
        DataType::Boolean => ColumnType::Bool,
        DataType::Date32 => ColumnType::Date,
        _ => ColumnType::Text,
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                let s = arrow::util::display::array_value_to_string(col, row).unwrap_or_default();
                CellValue::Text(s)
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col.as_any().downcast_ref::<Date32Array>().unwrap();
            date32_to_iso(arr.value(row))
                .map(CellValue::Date)
                .unwrap_or(CellValue::Null)
        }
        _ => {
            let s = arrow::util::display::array_value_to_string(col, row).unwrap_or_default();
            CellValue::Text(s)
        }
    }
}

/// Days since 1970-01-01 → ISO-8601 text.
fn date32_to_iso(days: i32) -> Option<String> {
    // 719163 = days from CE to the Unix epoch.
    NaiveDate::from_num_days_from_ce_opt(719_163 + days).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_csv_infers_types() {
        let input = "date,sales,region\n2023-01-01,10,North\n2023-01-02,25,South\n";
        let ds = load_csv(input.as_bytes()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.column_type("sales"), Some(ColumnType::Integer));
        assert_eq!(ds.column_type("region"), Some(ColumnType::Text));
        assert_eq!(ds.column_type("date"), Some(ColumnType::Date));
        assert_eq!(ds.cell(1, "sales"), Some(&CellValue::Integer(25)));
    }

    #[test]
    fn test_load_json_records() {
        let input = r#"[
            {"sales": 10, "region": "North"},
            {"sales": 2.5, "region": "South"},
            {"sales": null, "region": "East"}
        ]"#;
        let ds = load_json(input).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_type("sales"), Some(ColumnType::Float));
        assert_eq!(ds.cell(2, "sales"), Some(&CellValue::Null));
        assert_eq!(ds.cell(0, "region"), Some(&CellValue::Text("North".into())));
    }

    #[test]
    fn test_load_json_rejects_nested_values() {
        let input = r#"[{"sales": [1, 2]}]"#;
        assert!(matches!(load_json(input), Err(DataError::Malformed(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(matches!(err, DataError::UnsupportedExtension(ext) if ext == "xlsx"));
    }

    #[test]
    fn test_date32_roundtrip() {
        assert_eq!(date32_to_iso(0).as_deref(), Some("1970-01-01"));
        assert_eq!(date32_to_iso(19_358).as_deref(), Some("2023-01-01"));
    }
}
