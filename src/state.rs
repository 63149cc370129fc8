use std::collections::BTreeSet;

use crate::data::demo::demo_dataset;
use crate::data::filter::{filtered_indices, FilterState};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Chart selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VizKind {
    Histogram,
    ScatterPlot,
    LineChart,
    BoxPlot,
    CorrelationHeatmap,
}

impl VizKind {
    pub const ALL: [VizKind; 5] = [
        VizKind::Histogram,
        VizKind::ScatterPlot,
        VizKind::LineChart,
        VizKind::BoxPlot,
        VizKind::CorrelationHeatmap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VizKind::Histogram => "Histogram",
            VizKind::ScatterPlot => "Scatter Plot",
            VizKind::LineChart => "Line Chart",
            VizKind::BoxPlot => "Box Plot",
            VizKind::CorrelationHeatmap => "Correlation Heatmap",
        }
    }
}

/// Everything the user picked in the analysis section. Rebuilt to defaults
/// whenever the active dataset changes.
#[derive(Debug, Clone, PartialEq)]
pub struct VizSelection {
    pub kind: VizKind,
    pub histogram_column: Option<String>,
    pub scatter_x: Option<String>,
    pub scatter_y: Option<String>,
    pub color_by_category: bool,
    pub color_column: Option<String>,
    pub line_date_column: Option<String>,
    pub line_value_column: Option<String>,
    pub box_value_column: Option<String>,
    /// `None` means the ungrouped box plot.
    pub box_group_column: Option<String>,
    pub correlation_columns: BTreeSet<String>,
}

impl Default for VizSelection {
    fn default() -> Self {
        VizSelection {
            kind: VizKind::Histogram,
            histogram_column: None,
            scatter_x: None,
            scatter_y: None,
            color_by_category: false,
            color_column: None,
            line_date_column: None,
            line_value_column: None,
            box_value_column: None,
            box_group_column: None,
            correlation_columns: BTreeSet::new(),
        }
    }
}

impl VizSelection {
    /// Sensible defaults for a freshly loaded dataset: first numeric column
    /// everywhere, second numeric column for the scatter Y axis, up to five
    /// columns pre-selected for the correlation heatmap.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let numeric = dataset.numeric_columns();
        let date_like = dataset.date_like_columns();
        let categorical = dataset.categorical_columns();

        VizSelection {
            kind: VizKind::Histogram,
            histogram_column: numeric.first().cloned(),
            scatter_x: numeric.first().cloned(),
            scatter_y: numeric.get(1).or_else(|| numeric.first()).cloned(),
            color_by_category: false,
            color_column: categorical.first().cloned(),
            line_date_column: date_like.first().cloned(),
            line_value_column: numeric.first().cloned(),
            box_value_column: numeric.first().cloned(),
            box_group_column: None,
            correlation_columns: numeric.iter().take(5).cloned().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A file the user opened through the dialog.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub dataset: Dataset,
}

/// The full UI state, independent of rendering. The active dataset is
/// re-resolved on every source event (file opened, demo toggled):
/// upload takes precedence over demo data, and with neither the
/// dashboard shows only a prompt.
pub struct AppState {
    /// Dataset loaded from a file, if any.
    pub uploaded: Option<UploadedFile>,

    /// Whether the generated demo dataset is used when no file is loaded.
    pub use_demo: bool,

    /// The resolved active dataset.
    pub dataset: Option<Dataset>,

    /// Short description of where the active dataset came from.
    pub source_label: Option<String>,

    /// Chart kind and column choices.
    pub viz: VizSelection,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (original order).
    pub visible: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let mut state = Self {
            uploaded: None,
            use_demo: true,
            dataset: None,
            source_label: None,
            viz: VizSelection::default(),
            filters: FilterState::default(),
            visible: Vec::new(),
            status_message: None,
        };
        state.resolve_source();
        state
    }
}

impl AppState {
    /// Ingest a dataset loaded from a file; it takes precedence over demo data.
    pub fn set_uploaded(&mut self, name: String, dataset: Dataset) {
        log::info!(
            "Loaded '{}': {} rows × {} columns",
            name,
            dataset.len(),
            dataset.column_count()
        );
        self.uploaded = Some(UploadedFile { name, dataset });
        self.status_message = None;
        self.resolve_source();
    }

    /// Toggle demo data and re-resolve the active dataset.
    pub fn set_demo_enabled(&mut self, enabled: bool) {
        self.use_demo = enabled;
        self.resolve_source();
    }

    /// Pick the active dataset (upload > demo > none) and reset the filter
    /// and chart state for it.
    fn resolve_source(&mut self) {
        let (dataset, label) = if let Some(file) = &self.uploaded {
            (Some(file.dataset.clone()), Some(file.name.clone()))
        } else if self.use_demo {
            (Some(demo_dataset()), Some("demo data".to_string()))
        } else {
            (None, None)
        };

        self.source_label = label;
        match dataset {
            Some(ds) => {
                self.filters = FilterState::for_dataset(&ds);
                self.viz = VizSelection::defaults_for(&ds);
                self.visible = (0..ds.len()).collect();
                self.dataset = Some(ds);
            }
            None => {
                self.filters = FilterState::default();
                self.viz = VizSelection::default();
                self.visible.clear();
                self.dataset = None;
            }
        }
    }

    /// Recompute `visible` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible = filtered_indices(ds, &self.filters);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolves_demo_data() {
        let state = AppState::default();
        assert!(state.dataset.is_some());
        assert_eq!(state.source_label.as_deref(), Some("demo data"));
        assert_eq!(state.visible.len(), 100);
    }

    #[test]
    fn test_disabling_demo_clears_dataset() {
        let mut state = AppState::default();
        state.set_demo_enabled(false);
        assert!(state.dataset.is_none());
        assert!(state.visible.is_empty());
    }

    #[test]
    fn test_upload_takes_precedence_over_demo() {
        let mut state = AppState::default();
        let ds = Dataset::from_text_rows(
            vec!["a".to_string()],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );
        state.set_uploaded("tiny.csv".to_string(), ds);
        assert_eq!(state.source_label.as_deref(), Some("tiny.csv"));
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(2));
        // Demo toggle no longer affects the active dataset.
        state.set_demo_enabled(false);
        assert_eq!(state.dataset.as_ref().map(Dataset::len), Some(2));
    }

    #[test]
    fn test_viz_defaults_follow_schema() {
        let state = AppState::default();
        assert_eq!(state.viz.kind, VizKind::Histogram);
        assert_eq!(state.viz.histogram_column.as_deref(), Some("sales"));
        assert_eq!(state.viz.scatter_y.as_deref(), Some("customers"));
        assert_eq!(state.viz.line_date_column.as_deref(), Some("date"));
        assert_eq!(state.viz.correlation_columns.len(), 2);
    }
}
