use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points, Polygon};

use crate::color::{diverging_color, ColorMap};
use crate::data::model::{CellValue, Dataset};
use crate::state::{VizKind, VizSelection};
use crate::stats;

const PLOT_HEIGHT: f32 = 320.0;
const BAR_COLOR: Color32 = Color32::from_rgb(92, 140, 97);
const WARN_COLOR: Color32 = Color32::from_rgb(222, 165, 52);

/// Render the chart picked in the analysis section. Each variant is
/// best-effort: missing prerequisites produce a warning label, never an
/// aborted frame.
pub fn chart(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    match viz.kind {
        VizKind::Histogram => histogram(ui, dataset, viz),
        VizKind::ScatterPlot => scatter(ui, dataset, viz),
        VizKind::LineChart => line_chart(ui, dataset, viz),
        VizKind::BoxPlot => box_plot(ui, dataset, viz),
        VizKind::CorrelationHeatmap => correlation_heatmap(ui, dataset, viz),
    }
}

pub fn warning(ui: &mut Ui, text: &str) {
    ui.colored_label(WARN_COLOR, format!("⚠ {text}"));
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

fn histogram(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    let Some(column) = viz.histogram_column.as_deref() else {
        return;
    };
    let values = dataset.numeric_values(column);
    if values.is_empty() {
        warning(ui, &format!("Column '{column}' has no numeric values."));
        return;
    }

    let bins = stats::histogram(&values, stats::sturges_bins(values.len()));

    ui.strong(format!("Histogram of {column}"));
    Plot::new("histogram")
        .height(PLOT_HEIGHT)
        .x_axis_label(column)
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|bin| {
                    Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                        .width(bin.end - bin.start)
                        .fill(BAR_COLOR.linear_multiply(0.7))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(column));
        });
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

fn scatter(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    let (Some(col_x), Some(col_y)) = (viz.scatter_x.as_deref(), viz.scatter_y.as_deref()) else {
        return;
    };
    let (Some(x_idx), Some(y_idx)) = (dataset.column_index(col_x), dataset.column_index(col_y))
    else {
        return;
    };

    let color_by = viz
        .color_by_category
        .then(|| viz.color_column.as_deref())
        .flatten();

    ui.strong(format!("{col_y} vs {col_x}"));
    let plot = Plot::new("scatter")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(col_x)
        .y_axis_label(col_y);

    plot.show(ui, |plot_ui| match color_by {
        // One series per category value, legend keyed by category.
        Some(group_col) => {
            let Some(group_idx) = dataset.column_index(group_col) else {
                return;
            };
            let mut groups: BTreeMap<&CellValue, Vec<[f64; 2]>> = BTreeMap::new();
            for row in &dataset.rows {
                if let (Some(x), Some(y)) = (row[x_idx].as_f64(), row[y_idx].as_f64()) {
                    groups.entry(&row[group_idx]).or_default().push([x, y]);
                }
            }
            let colors = dataset
                .unique_values
                .get(group_col)
                .map(ColorMap::new)
                .unwrap_or_else(|| ColorMap::new(&Default::default()));
            for (value, points) in groups {
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .name(value.to_string())
                        .color(colors.color_for(value))
                        .radius(2.5),
                );
            }
        }
        None => {
            let points: Vec<[f64; 2]> = dataset
                .rows
                .iter()
                .filter_map(|row| Some([row[x_idx].as_f64()?, row[y_idx].as_f64()?]))
                .collect();
            plot_ui.points(
                Points::new(PlotPoints::new(points))
                    .color(Color32::LIGHT_BLUE)
                    .radius(2.5),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Line chart (mean per date, ascending)
// ---------------------------------------------------------------------------

fn line_chart(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    if dataset.date_like_columns().is_empty() {
        warning(
            ui,
            "No date column found for line chart. Please select another visualization.",
        );
        return;
    }
    let (Some(date_col), Some(value_col)) = (
        viz.line_date_column.as_deref(),
        viz.line_value_column.as_deref(),
    ) else {
        return;
    };
    let (Some(date_idx), Some(value_idx)) = (
        dataset.column_index(date_col),
        dataset.column_index(value_col),
    ) else {
        return;
    };

    let pairs: Vec<(NaiveDate, f64)> = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let date = parse_date_cell(&row[date_idx])?;
            let value = row[value_idx].as_f64()?;
            Some((date, value))
        })
        .collect();

    if pairs.is_empty() {
        warning(ui, &format!("Column '{date_col}' has no parseable dates."));
        return;
    }

    let series = stats::mean_by_date(&pairs);
    let points: Vec<[f64; 2]> = series
        .iter()
        .map(|(date, value)| [date.num_days_from_ce() as f64, *value])
        .collect();

    ui.strong(format!("{value_col} Over Time"));
    Plot::new("line_chart")
        .height(PLOT_HEIGHT)
        .x_axis_label(date_col)
        .y_axis_label(value_col)
        .x_axis_formatter(|mark, _range| format_day_number(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(points))
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
        });
}

fn parse_date_cell(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(s) | CellValue::Text(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
        }
        _ => None,
    }
}

fn format_day_number(value: f64) -> String {
    if !(i32::MIN as f64..=i32::MAX as f64).contains(&value) {
        return String::new();
    }
    NaiveDate::from_num_days_from_ce_opt(value as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

fn box_plot(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    let Some(value_col) = viz.box_value_column.as_deref() else {
        return;
    };
    let Some(value_idx) = dataset.column_index(value_col) else {
        return;
    };

    // (label, values, color) per box; ungrouped data is a single "All" box.
    let group = viz
        .box_group_column
        .as_deref()
        .and_then(|g| dataset.column_index(g).map(|idx| (g, idx)));
    let mut groups: Vec<(String, Vec<f64>, Color32)> = Vec::new();
    match group {
        Some((group_col, group_idx)) => {
            let mut by_value: BTreeMap<&CellValue, Vec<f64>> = BTreeMap::new();
            for row in &dataset.rows {
                if let Some(v) = row[value_idx].as_f64() {
                    by_value.entry(&row[group_idx]).or_default().push(v);
                }
            }
            let colors = dataset
                .unique_values
                .get(group_col)
                .map(ColorMap::new)
                .unwrap_or_else(|| ColorMap::new(&Default::default()));
            for (value, values) in by_value {
                groups.push((value.to_string(), values, colors.color_for(value)));
            }
        }
        None => {
            groups.push((
                "All".to_string(),
                dataset.numeric_values(value_col),
                Color32::LIGHT_BLUE,
            ));
        }
    }

    let title = match group {
        Some((group_col, _)) => format!("Box Plot of {value_col} by {group_col}"),
        None => format!("Box Plot of {value_col}"),
    };
    ui.strong(title);

    let labels: Vec<String> = groups.iter().map(|(label, _, _)| label.clone()).collect();
    Plot::new("box_plot")
        .height(PLOT_HEIGHT)
        .y_axis_label(value_col)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, (_, values, color)) in groups.iter().enumerate() {
                if let Some(stats) = stats::box_stats(values) {
                    draw_box(plot_ui, i as f64, &stats, *color);
                }
            }
        });
}

/// Draw one box at `x`: quartile box, median line, IQR whiskers with caps,
/// outliers as points.
fn draw_box(plot_ui: &mut PlotUi, x: f64, stats: &stats::BoxStats, color: Color32) {
    let half = 0.3;
    let cap = half * 0.5;

    let box_points = vec![
        [x - half, stats.q1],
        [x + half, stats.q1],
        [x + half, stats.q3],
        [x - half, stats.q3],
    ];
    plot_ui.polygon(
        Polygon::new(PlotPoints::new(box_points))
            .fill_color(color.linear_multiply(0.3))
            .stroke(Stroke::new(1.5, color)),
    );

    plot_ui.line(
        Line::new(PlotPoints::new(vec![
            [x - half, stats.median],
            [x + half, stats.median],
        ]))
        .color(color)
        .width(2.0),
    );

    for (from, to) in [
        (stats.q3, stats.whisker_max),
        (stats.q1, stats.whisker_min),
    ] {
        plot_ui.line(
            Line::new(PlotPoints::new(vec![[x, from], [x, to]]))
                .color(color)
                .width(1.0),
        );
    }
    for y in [stats.whisker_min, stats.whisker_max] {
        plot_ui.line(
            Line::new(PlotPoints::new(vec![[x - cap, y], [x + cap, y]]))
                .color(color)
                .width(1.0),
        );
    }

    if !stats.outliers.is_empty() {
        let outlier_points: Vec<[f64; 2]> = stats.outliers.iter().map(|&v| [x, v]).collect();
        plot_ui.points(
            Points::new(PlotPoints::new(outlier_points))
                .color(color)
                .radius(2.0),
        );
    }
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_heatmap(ui: &mut Ui, dataset: &Dataset, viz: &VizSelection) {
    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        warning(ui, "Need at least 2 numeric columns for correlation analysis.");
        return;
    }

    // Selected columns, in schema order.
    let selected: Vec<String> = numeric
        .into_iter()
        .filter(|c| viz.correlation_columns.contains(c))
        .collect();
    if selected.is_empty() {
        warning(ui, "Please select at least one column for correlation analysis.");
        return;
    }

    let columns: Vec<Vec<f64>> = selected
        .iter()
        .map(|c| dataset.aligned_numeric_values(c))
        .collect();
    let matrix = stats::correlation_matrix(&columns);

    ui.strong("Correlation Heatmap");
    let n = selected.len();
    let label_margin = 96.0;
    let cell = ((ui.available_width() - label_margin) / n as f32).clamp(24.0, 56.0);
    let side = label_margin + cell * n as f32;
    let (rect, _) = ui.allocate_exact_size(Vec2::new(side, side), Sense::hover());
    let painter = ui.painter_at(rect);
    let origin = rect.min + Vec2::new(label_margin, label_margin);

    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let cell_rect = Rect::from_min_size(
                origin + Vec2::new(j as f32 * cell, i as f32 * cell),
                Vec2::splat(cell),
            );
            painter.rect_filled(cell_rect, egui::CornerRadius::ZERO, diverging_color(value));

            if cell > 20.0 {
                let text_color = if value.abs() > 0.5 {
                    Color32::WHITE
                } else {
                    Color32::BLACK
                };
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{value:.2}"),
                    FontId::proportional(10.0),
                    text_color,
                );
            }
        }
    }

    let label_color = ui.visuals().text_color();
    for (i, name) in selected.iter().enumerate() {
        painter.text(
            egui::pos2(origin.x + (i as f32 + 0.5) * cell, origin.y - 4.0),
            Align2::CENTER_BOTTOM,
            name,
            FontId::proportional(11.0),
            label_color,
        );
        painter.text(
            egui::pos2(origin.x - 4.0, origin.y + (i as f32 + 0.5) * cell),
            Align2::RIGHT_CENTER,
            name,
            FontId::proportional(11.0),
            label_color,
        );
    }
}
