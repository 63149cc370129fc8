use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Default name offered in the save dialog.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// Serialize the given rows of a dataset to CSV: UTF-8, comma-delimited,
/// header row, no index column. Fields use the exact text form so the
/// output re-parses to the same values.
pub fn to_csv_bytes(dataset: &Dataset, indices: &[usize]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(dataset.columns.iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;

    for &idx in indices {
        let row = dataset
            .rows
            .get(idx)
            .with_context(|| format!("row index {idx} out of bounds"))?;
        writer
            .write_record(row.iter().map(|cell| cell.csv_field()))
            .with_context(|| format!("writing CSV row {idx}"))?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {e}"))
}

/// Write the filtered rows to a file on disk.
pub fn save_filtered(dataset: &Dataset, indices: &[usize], path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(dataset, indices)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", indices.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::demo::demo_dataset;
    use crate::data::filter::{filtered_indices, FilterState, NumericRange};
    use crate::data::loader::load_csv;
    use crate::data::model::CellValue;

    #[test]
    fn test_export_has_header_and_no_index() {
        let ds = demo_dataset();
        let bytes = to_csv_bytes(&ds, &[0, 1]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("date,sales,customers,category,region")
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn test_filtered_export_reparses_to_same_rows() {
        let ds = demo_dataset();
        let mut filters = FilterState::for_dataset(&ds);
        filters.selected.insert(
            "region".to_string(),
            BTreeSet::from([
                CellValue::Text("North".to_string()),
                CellValue::Text("South".to_string()),
            ]),
        );
        filters.ranges.insert(
            "sales".to_string(),
            NumericRange {
                min: 50.0,
                max: 100.0,
            },
        );
        let kept = filtered_indices(&ds, &filters);

        let bytes = to_csv_bytes(&ds, &kept).unwrap();
        let reloaded = load_csv(bytes.as_slice()).unwrap();

        assert_eq!(reloaded.len(), kept.len());
        for (out_row, &src_idx) in reloaded.rows.iter().zip(&kept) {
            assert_eq!(out_row, &ds.rows[src_idx]);
        }
    }
}
