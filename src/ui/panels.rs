use eframe::egui::{self, Color32, ComboBox, DragValue, RichText, ScrollArea, Ui};

use crate::data::export::{save_filtered, EXPORT_FILE_NAME};
use crate::data::filter::{self, NumericRange};
use crate::data::loader;
use crate::state::{AppState, VizKind};
use crate::ui::{plot, table};

/// Row cap for the preview tables.
const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows × {} columns, {} visible",
                ds.len(),
                ds.column_count(),
                state.visible.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – data source controls
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    if ui.button("Open data file…").clicked() {
        open_file_dialog(state);
    }

    let mut use_demo = state.use_demo;
    if ui.checkbox(&mut use_demo, "Use demo data").changed() {
        state.set_demo_enabled(use_demo);
    }

    ui.add_space(4.0);
    match &state.source_label {
        Some(label) => {
            ui.label(format!("Source: {label}"));
        }
        None => {
            ui.weak("No data loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – overview, analysis, filtering
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui| {
            ui.heading("Please open a CSV file or enable the demo data");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.heading("📊 Data Explorer Dashboard");
            ui.label("Explore your tabular data with interactive visualizations and filters.");
            ui.separator();

            overview_section(ui, state);
            ui.separator();
            analysis_section(ui, state);
            ui.separator();
            filter_section(ui, state);
        });
}

fn overview_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else { return };

    ui.heading("Data Overview");
    ui.add_space(4.0);

    ui.strong("Data Preview");
    let head: Vec<usize> = (0..dataset.len().min(PREVIEW_ROWS)).collect();
    table::dataset_preview(ui, "overview", dataset, &head, PREVIEW_ROWS);

    ui.add_space(8.0);
    ui.label(format!("Rows: {}", dataset.len()));
    ui.label(format!("Columns: {}", dataset.column_count()));

    ui.add_space(4.0);
    ui.strong("Column Types");
    table::column_types_table(ui, dataset);
}

fn analysis_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else { return };

    ui.heading("Data Analysis");
    ui.add_space(4.0);

    let numeric = dataset.numeric_columns();
    if numeric.is_empty() {
        plot::warning(ui, "No numeric columns found in the data for visualization.");
        return;
    }
    let categorical = dataset.categorical_columns();
    let date_like = dataset.date_like_columns();

    ComboBox::from_label("Select Visualization Type")
        .selected_text(state.viz.kind.label())
        .show_ui(ui, |ui| {
            for kind in VizKind::ALL {
                ui.selectable_value(&mut state.viz.kind, kind, kind.label());
            }
        });

    match state.viz.kind {
        VizKind::Histogram => {
            column_combo(
                ui,
                "Select column for histogram",
                &numeric,
                &mut state.viz.histogram_column,
            );
        }
        VizKind::ScatterPlot => {
            column_combo(ui, "Select X-axis column", &numeric, &mut state.viz.scatter_x);
            column_combo(ui, "Select Y-axis column", &numeric, &mut state.viz.scatter_y);
            if !categorical.is_empty() {
                ui.checkbox(&mut state.viz.color_by_category, "Color by category");
                if state.viz.color_by_category {
                    column_combo(
                        ui,
                        "Select category for coloring",
                        &categorical,
                        &mut state.viz.color_column,
                    );
                }
            }
        }
        VizKind::LineChart => {
            if !date_like.is_empty() {
                column_combo(
                    ui,
                    "Select date column",
                    &date_like,
                    &mut state.viz.line_date_column,
                );
                column_combo(
                    ui,
                    "Select value column",
                    &numeric,
                    &mut state.viz.line_value_column,
                );
            }
        }
        VizKind::BoxPlot => {
            column_combo(
                ui,
                "Select numeric column",
                &numeric,
                &mut state.viz.box_value_column,
            );
            if !categorical.is_empty() {
                optional_column_combo(
                    ui,
                    "Group by (optional)",
                    &categorical,
                    &mut state.viz.box_group_column,
                );
            }
        }
        VizKind::CorrelationHeatmap => {
            if numeric.len() > 1 {
                ui.label("Select columns for correlation");
                ui.horizontal_wrapped(|ui| {
                    for col in &numeric {
                        let mut checked = state.viz.correlation_columns.contains(col);
                        if ui.checkbox(&mut checked, col).changed() {
                            if checked {
                                state.viz.correlation_columns.insert(col.clone());
                            } else {
                                state.viz.correlation_columns.remove(col);
                            }
                        }
                    }
                });
            }
        }
    }

    ui.add_space(4.0);
    plot::chart(ui, dataset, &state.viz);
}

fn filter_section(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else { return };

    ui.heading("Data Filtering");
    ui.add_space(4.0);

    let cat_cols = filter::categorical_filter_columns(dataset);
    let num_cols = filter::numeric_filter_columns(dataset);

    if !cat_cols.is_empty() {
        ui.strong("Categorical Filters:");
        for col in &cat_cols {
            let Some(all_values) = dataset.unique_values.get(col) else {
                continue;
            };
            let all_values = all_values.clone();
            let selected = state.filters.selected.entry(col.clone()).or_default();

            let header = format!("{col}  ({}/{})", selected.len(), all_values.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt(col)
                .default_open(false)
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        if ui.small_button("All").clicked() {
                            *selected = all_values.clone();
                        }
                        if ui.small_button("None").clicked() {
                            selected.clear();
                        }
                    });

                    for val in &all_values {
                        let mut checked = selected.contains(val);
                        if ui.checkbox(&mut checked, val.to_string()).changed() {
                            if checked {
                                selected.insert(val.clone());
                            } else {
                                selected.remove(val);
                            }
                        }
                    }
                });
        }
    }

    if !num_cols.is_empty() {
        ui.strong("Numeric Filters:");
        for col in &num_cols {
            let Some((true_min, true_max)) = filter::column_bounds(dataset, col) else {
                continue;
            };
            let speed = ((true_max - true_min) / 100.0).max(0.01);
            let range = state
                .filters
                .ranges
                .entry(col.clone())
                .or_insert(NumericRange {
                    min: true_min,
                    max: true_max,
                });

            ui.horizontal(|ui| {
                ui.label(format!("Min {col}"));
                ui.add(DragValue::new(&mut range.min).speed(speed));
                ui.label(format!("Max {col}"));
                ui.add(DragValue::new(&mut range.max).speed(speed));
            });
        }
    }

    // Recompute visible rows after any widget changes.
    state.refilter();

    let Some(dataset) = &state.dataset else { return };
    let active = filter::any_filter_active(dataset, &state.filters);

    ui.add_space(8.0);
    ui.strong("Filtered Data");
    ui.label(format!(
        "Showing {} of {} rows",
        state.visible.len(),
        dataset.len()
    ));
    if !active {
        ui.weak("No filters applied. Adjust the filters above to see filtered data.");
    }
    table::dataset_preview(ui, "filtered", dataset, &state.visible, PREVIEW_ROWS);

    if ui.button("Download filtered data as CSV").clicked() {
        let picked = rfd::FileDialog::new()
            .set_title("Save filtered data")
            .set_file_name(EXPORT_FILE_NAME)
            .add_filter("CSV", &["csv"])
            .save_file();
        if let Some(path) = picked {
            match save_filtered(dataset, &state.visible, &path) {
                Ok(()) => {
                    state.status_message = None;
                }
                Err(e) => {
                    log::error!("Failed to export filtered data: {e:#}");
                    state.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Column selection combos
// ---------------------------------------------------------------------------

/// Combo over column names. An invalid or missing selection snaps to the
/// first option so the chart always has a column once one exists.
fn column_combo(ui: &mut Ui, label: &str, options: &[String], selection: &mut Option<String>) {
    let valid = selection
        .as_deref()
        .is_some_and(|s| options.iter().any(|o| o == s));
    if !valid {
        *selection = options.first().cloned();
    }

    ComboBox::from_label(label)
        .selected_text(selection.clone().unwrap_or_default())
        .show_ui(ui, |ui| {
            for opt in options {
                let is_selected = selection.as_deref() == Some(opt.as_str());
                if ui.selectable_label(is_selected, opt).clicked() {
                    *selection = Some(opt.clone());
                }
            }
        });
}

/// Combo with a leading "None" entry for optional groupings.
fn optional_column_combo(
    ui: &mut Ui,
    label: &str,
    options: &[String],
    selection: &mut Option<String>,
) {
    if let Some(s) = selection.as_deref() {
        if !options.iter().any(|o| o == s) {
            *selection = None;
        }
    }

    ComboBox::from_label(label)
        .selected_text(selection.clone().unwrap_or_else(|| "None".to_string()))
        .show_ui(ui, |ui| {
            if ui.selectable_label(selection.is_none(), "None").clicked() {
                *selection = None;
            }
            for opt in options {
                let is_selected = selection.as_deref() == Some(opt.as_str());
                if ui.selectable_label(is_selected, opt).clicked() {
                    *selection = Some(opt.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path) {
            Ok(dataset) => {
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("uploaded file")
                    .to_string();
                state.set_uploaded(name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
