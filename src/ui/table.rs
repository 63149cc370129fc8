use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Dataset;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;

/// Render the first `max_rows` of the given row indices as a striped table
/// with a header row. `salt` keeps egui IDs distinct between the overview
/// and filtered previews.
pub fn dataset_preview(ui: &mut Ui, salt: &str, dataset: &Dataset, rows: &[usize], max_rows: usize) {
    let shown = rows.len().min(max_rows);

    ui.push_id(salt, |ui| {
        let mut builder = TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(false);

        for _ in &dataset.columns {
            builder = builder.column(TableColumn::auto().at_least(60.0).clip(true));
        }

        builder
            .header(HEADER_HEIGHT, |mut header| {
                for col in &dataset.columns {
                    header.col(|ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, shown, |mut row| {
                    let dataset_row = rows[row.index()];
                    for cell in &dataset.rows[dataset_row] {
                        row.col(|ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            });
    });

    if rows.len() > shown {
        ui.weak(format!("… and {} more rows", rows.len() - shown));
    }
}

/// Render the per-column type table of the schema summary.
pub fn column_types_table(ui: &mut Ui, dataset: &Dataset) {
    ui.push_id("column_types", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .min_scrolled_height(0.0)
            .vscroll(false)
            .column(TableColumn::auto().at_least(100.0))
            .column(TableColumn::auto().at_least(60.0))
            .header(HEADER_HEIGHT, |mut header| {
                header.col(|ui| {
                    ui.strong("Column");
                });
                header.col(|ui| {
                    ui.strong("Type");
                });
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, dataset.columns.len(), |mut row| {
                    let col = &dataset.columns[row.index()];
                    row.col(|ui| {
                        ui.label(&col.name);
                    });
                    row.col(|ui| {
                        ui.label(col.ty.to_string());
                    });
                });
            });
    });
}
