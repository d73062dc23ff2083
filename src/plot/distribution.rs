//! Histograms.

use std::path::Path;

use plotters::prelude::*;

use crate::table::Table;
use crate::{FlakestatError, FlakestatResult};

use super::{axis_range, color_palette, hue_groups, plot_err, ChartStyle};

/// Column and binning of a histogram.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub column: String,
    /// One bar layer per distinct value of this column.
    pub hue: Option<String>,
    /// Bin width; Sturges' rule when unset.
    pub binwidth: Option<f64>,
}

impl Distribution {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            hue: None,
            binwidth: None,
        }
    }

    pub fn hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }

    pub fn binwidth(mut self, width: f64) -> Self {
        self.binwidth = Some(width);
        self
    }
}

/// Upper bound on the number of bins of one histogram.
const MAX_BINS: usize = 10_000;

/// Left edges shared by all layers plus the bin width.
fn bin_edges(values: &[f64], binwidth: Option<f64>) -> FlakestatResult<(Vec<f64>, f64)> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if min > max {
        return Err(FlakestatError::plot("no numeric data to plot"));
    }

    let width = match binwidth {
        Some(w) if w > 0.0 => w,
        Some(w) => return Err(FlakestatError::plot(format!("invalid bin width {}", w))),
        None => {
            let bins = (values.len() as f64).log2().ceil() as usize + 1;
            let span = max - min;
            if span == 0.0 {
                1.0
            } else {
                span / bins as f64
            }
        }
    };

    let span_bins = ((max - min) / width).floor();
    if !span_bins.is_finite() || span_bins >= MAX_BINS as f64 {
        return Err(FlakestatError::plot(format!(
            "bin width {} gives more than {} bins",
            width, MAX_BINS
        )));
    }
    let count = span_bins as usize + 1;
    Ok(((0..count).map(|i| min + i as f64 * width).collect(), width))
}

fn bin_counts(values: &[f64], edges: &[f64], width: f64) -> Vec<usize> {
    let mut counts = vec![0; edges.len()];
    let Some(&start) = edges.first() else {
        return counts;
    };
    for v in values {
        let idx = (((v - start) / width).floor() as usize).min(edges.len() - 1);
        counts[idx] += 1;
    }
    counts
}

pub(super) fn render(
    table: &Table,
    plot: &Distribution,
    style: &ChartStyle,
    path: &Path,
) -> FlakestatResult<()> {
    let column = table
        .column_index(&plot.column)
        .ok_or_else(|| FlakestatError::UnknownColumn(plot.column.clone()))?;

    let mut layers = Vec::new();
    for (label, rows) in hue_groups(table, plot.hue.as_deref())? {
        let mut values = Vec::with_capacity(rows.len());
        for i in rows {
            let Some(row) = table.row(i) else { continue };
            let value = &row.values()[column];
            if value.is_missing() {
                continue;
            }
            let v = value.as_f64().ok_or_else(|| {
                FlakestatError::plot(format!("column '{}' is not numeric", plot.column))
            })?;
            if !v.is_finite() {
                tracing::warn!(column = %plot.column, value = v, "Skipping non-finite value");
                continue;
            }
            values.push(v);
        }
        layers.push((label, values));
    }

    let all: Vec<f64> = layers.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let (edges, width) = bin_edges(&all, plot.binwidth)?;
    let counted: Vec<(Option<String>, Vec<usize>)> = layers
        .into_iter()
        .map(|(label, values)| (label, bin_counts(&values, &edges, width)))
        .collect();

    let max_count = counted
        .iter()
        .flat_map(|(_, c)| c.iter().copied())
        .max()
        .unwrap_or(0);

    let x_range = axis_range(
        edges.iter().copied().chain(edges.last().map(|e| e + width)),
        style.x_lim,
    )?;
    let y_range = match style.y_lim {
        Some(_) => axis_range(std::iter::empty(), style.y_lim)?,
        None => 0.0..(max_count.max(1) as f64 * 1.05),
    };

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

    let colors = color_palette(counted.len());
    let alpha = if counted.len() > 1 { 0.5 } else { 0.9 };
    for ((label, counts), color) in counted.iter().zip(colors) {
        let bars = edges.iter().zip(counts).filter(|(_, c)| **c > 0).map(|(&x, &c)| {
            Rectangle::new([(x, 0.0), (x + width, c as f64)], color.mix(alpha).filled())
        });
        let series = chart.draw_series(bars).map_err(plot_err)?;
        if let Some(label) = label {
            series.label(label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.mix(alpha).filled())
            });
        }

        let outlines = edges.iter().zip(counts).filter(|(_, c)| **c > 0).map(|(&x, &c)| {
            Rectangle::new([(x, 0.0), (x + width, c as f64)], BLACK.stroke_width(1))
        });
        chart.draw_series(outlines).map_err(plot_err)?;
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
