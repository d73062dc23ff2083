//! Line charts.

use std::path::Path;

use plotters::prelude::*;

use crate::table::Table;
use crate::{FlakestatError, FlakestatResult};

use super::{axis_range, color_palette, hue_groups, plot_err, ChartStyle};

/// Columns of a line chart.
#[derive(Debug, Clone)]
pub struct LinePlot {
    pub x: String,
    pub y: String,
    /// One line per distinct value of this column.
    pub hue: Option<String>,
}

impl LinePlot {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            hue: None,
        }
    }

    pub fn hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }
}

/// Points of one line: mean `y` per distinct `x`, sorted by `x`.
fn mean_by_x(table: &Table, plot: &LinePlot, rows: &[usize]) -> FlakestatResult<Vec<(f64, f64)>> {
    let mut points = Vec::with_capacity(rows.len());
    for &i in rows {
        let Some(row) = table.row(i) else { continue };
        let x = row
            .get(&plot.x)
            .ok_or_else(|| FlakestatError::UnknownColumn(plot.x.clone()))?;
        let y = row
            .get(&plot.y)
            .ok_or_else(|| FlakestatError::UnknownColumn(plot.y.clone()))?;
        if x.is_missing() || y.is_missing() {
            continue;
        }
        match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => points.push((x, y)),
            _ => {
                return Err(FlakestatError::plot(format!(
                    "line plots need numeric '{}' and '{}' columns",
                    plot.x, plot.y
                )))
            }
        }
    }

    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64, usize)> = Vec::new();
    for (x, y) in points {
        match merged.last_mut() {
            Some((last_x, sum, n)) if *last_x == x => {
                *sum += y;
                *n += 1;
            }
            _ => merged.push((x, y, 1)),
        }
    }

    Ok(merged
        .into_iter()
        .map(|(x, sum, n)| (x, sum / n as f64))
        .collect())
}

pub(super) fn render(
    table: &Table,
    plot: &LinePlot,
    style: &ChartStyle,
    path: &Path,
) -> FlakestatResult<()> {
    let groups = hue_groups(table, plot.hue.as_deref())?;
    let mut lines = Vec::with_capacity(groups.len());
    for (label, rows) in groups {
        lines.push((label, mean_by_x(table, plot, &rows)?));
    }

    let all_points: Vec<(f64, f64)> = lines
        .iter()
        .flat_map(|(_, points)| points.iter().copied())
        .collect();
    let x_range = axis_range(all_points.iter().map(|p| p.0), style.x_lim)?;
    let y_range = axis_range(all_points.iter().map(|p| p.1), style.y_lim)?;

    let root = SVGBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .axis_desc_style(style.font())
        .label_style(style.font())
        .draw()
        .map_err(plot_err)?;

    let colors = color_palette(lines.len());
    for ((label, points), color) in lines.iter().zip(colors) {
        let series = chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(plot_err)?;
        if let Some(label) = label {
            series
                .label(label.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }
    }

    if let (Some(position), Some(_)) = (style.legend, plot.hue.as_ref()) {
        chart
            .configure_series_labels()
            .position(position.series_label_position())
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(style.font())
            .draw()
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}
