//! Box plots over a categorical x axis.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::table::{Table, Value};
use crate::{FlakestatError, FlakestatResult};

use super::{axis_range, color_palette, plot_err, ChartStyle};

/// Columns and layout of a box plot.
#[derive(Debug, Clone)]
pub struct BoxPlot {
    /// Categorical column; one slot per distinct value.
    pub x: String,
    /// Numeric column summarised by each box.
    pub y: String,
    /// Side-by-side boxes per distinct value of this column.
    pub hue: Option<String>,
    /// Plot `log10(y)`; non-positive values are dropped.
    pub log_scale: bool,
    /// Hide every other category label instead of rotating them.
    pub sparse_ticks: bool,
}

impl BoxPlot {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            hue: None,
            log_scale: false,
            sparse_ticks: false,
        }
    }

    pub fn hue(mut self, column: impl Into<String>) -> Self {
        self.hue = Some(column.into());
        self
    }

    pub fn log_scale(mut self, enabled: bool) -> Self {
        self.log_scale = enabled;
        self
    }

    pub fn sparse_ticks(mut self, enabled: bool) -> Self {
        self.sparse_ticks = enabled;
        self
    }
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
struct BoxStats {
    lower_whisker: f64,
    q1: f64,
    median: f64,
    q3: f64,
    upper_whisker: f64,
    outliers: Vec<f64>,
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

impl BoxStats {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile(&values, 0.25);
        let median = quantile(&values, 0.5);
        let q3 = quantile(&values, 0.75);
        let reach = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let inside = values.iter().copied().filter(|v| *v >= low_fence && *v <= high_fence);
        let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
        let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

/// Category label; floats are shown with two decimals and thousands separators.
fn category_label(value: &Value) -> String {
    match value {
        Value::Float(f) => thousands(*f),
        other => other.to_string(),
    }
}

fn thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Distinct x values; numeric categories are sorted, others keep first-seen order.
fn categories(table: &Table, column: &str) -> FlakestatResult<Vec<Value>> {
    let mut values = table.unique(column)?;
    if values.iter().all(|v| v.as_f64().is_some()) {
        values.sort_by(|a, b| {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            a.total_cmp(&b)
        });
    }
    Ok(values)
}

pub(super) fn render(
    table: &Table,
    plot: &BoxPlot,
    style: &ChartStyle,
    path: &Path,
) -> FlakestatResult<()> {
    let x_idx = table
        .column_index(&plot.x)
        .ok_or_else(|| FlakestatError::UnknownColumn(plot.x.clone()))?;
    let y_idx = table
        .column_index(&plot.y)
        .ok_or_else(|| FlakestatError::UnknownColumn(plot.y.clone()))?;
    let hue_idx = match &plot.hue {
        Some(hue) => Some(
            table
                .column_index(hue)
                .ok_or_else(|| FlakestatError::UnknownColumn(hue.clone()))?,
        ),
        None => None,
    };

    let cats = categories(table, &plot.x)?;
    let hues: Vec<Option<Value>> = match &plot.hue {
        Some(hue) => table.unique(hue)?.into_iter().map(Some).collect(),
        None => vec![None],
    };

    // (category index, hue index, stats)
    let mut boxes = Vec::new();
    for (ci, cat) in cats.iter().enumerate() {
        for (hi, hue) in hues.iter().enumerate() {
            let mut values = Vec::new();
            for row in table.rows() {
                let row = row.values();
                if row[x_idx] != *cat {
                    continue;
                }
                if let (Some(h_idx), Some(hue)) = (hue_idx, hue) {
                    if row[h_idx] != *hue {
                        continue;
                    }
                }
                if row[y_idx].is_missing() {
                    continue;
                }
                let y = row[y_idx].as_f64().ok_or_else(|| {
                    FlakestatError::plot(format!("column '{}' is not numeric", plot.y))
                })?;
                if !y.is_finite() {
                    tracing::warn!(column = %plot.y, value = y, "Skipping non-finite value");
                    continue;
                }
                if plot.log_scale {
                    if y <= 0.0 {
                        tracing::warn!(value = y, "Dropping non-positive value on log scale");
                        continue;
                    }
                    values.push(y.log10());
                } else {
                    values.push(y);
                }
            }
            if let Some(stats) = BoxStats::from_values(values) {
                boxes.push((ci, hi, stats));
            }
        }
    }

    if boxes.is_empty() {
        return Err(FlakestatError::plot("no numeric data to plot"));
    }

    let y_lim = match (style.y_lim, plot.log_scale) {
        (Some((lo, hi)), true) => Some((lo.log10(), hi.log10())),
        (lim, _) => lim,
    };
    let y_range = axis_range(
        boxes.iter().flat_map(|(_, _, s)| {
            [s.lower_whisker, s.upper_whisker]
                .into_iter()
                .chain(s.outliers.iter().copied())
        }),
        y_lim,
    )?;
    let y_floor = y_range.start;
    let x_range = -0.5..(cats.len() as f64 - 0.5);

    let root = SVGBackend::new(path, style.size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let label_area = if plot.sparse_ticks { 50 } else { 90 };
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .x_label_area_size(label_area)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    let log_scale = plot.log_scale;
    let y_formatter = move |y: &f64| {
        if log_scale {
            format!("{:.1e}", 10f64.powf(*y))
        } else {
            format!("{:.2}", y)
        }
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc(style.y_label.as_str())
        .y_label_formatter(&y_formatter)
        .axis_desc_style(style.font())
        .label_style(style.font())
        .draw()
        .map_err(plot_err)?;

    let colors = color_palette(hues.len());
    let slot = 0.8 / hues.len() as f64;
    let mut labelled = vec![false; hues.len()];

    for (ci, hi, stats) in &boxes {
        let color = colors[*hi];
        let left = *ci as f64 - 0.4 + slot * *hi as f64 + slot * 0.1;
        let right = left + slot * 0.8;
        let center = (left + right) / 2.0;

        let body = chart
            .draw_series(std::iter::once(Rectangle::new(
                [(left, stats.q1), (right, stats.q3)],
                color.filled(),
            )))
            .map_err(plot_err)?;
        if let (false, Some(Some(hue))) = (labelled[*hi], hues.get(*hi)) {
            body.label(hue.to_string()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
            labelled[*hi] = true;
        }

        let area = chart.plotting_area();
        let cap = slot * 0.2;
        let thin = BLACK.stroke_width(1);
        let segments = [
            (vec![(left, stats.q1), (right, stats.q1), (right, stats.q3), (left, stats.q3), (left, stats.q1)], thin),
            (vec![(left, stats.median), (right, stats.median)], BLACK.stroke_width(2)),
            (vec![(center, stats.q3), (center, stats.upper_whisker)], thin),
            (vec![(center, stats.q1), (center, stats.lower_whisker)], thin),
            (vec![(center - cap, stats.upper_whisker), (center + cap, stats.upper_whisker)], thin),
            (vec![(center - cap, stats.lower_whisker), (center + cap, stats.lower_whisker)], thin),
        ];
        for (points, line_style) in segments {
            area.draw(&PathElement::new(points, line_style))
                .map_err(plot_err)?;
        }
        for outlier in &stats.outliers {
            area.draw(&Circle::new((center, *outlier), 3, thin))
                .map_err(plot_err)?;
        }
    }

    // Category labels drawn below the plotting area.
    let tick_font = ("sans-serif", f64::from(style.font_size)).into_font();
    for (ci, cat) in cats.iter().enumerate() {
        if plot.sparse_ticks && ci % 2 == 1 {
            continue;
        }
        let (px, py) = chart.backend_coord(&(ci as f64, y_floor));
        let text_style = if plot.sparse_ticks {
            tick_font
                .clone()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top))
        } else {
            tick_font
                .clone()
                .transform(FontTransform::Rotate270)
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Center))
        };
        root.draw(&Text::new(category_label(cat), (px, py + 8), text_style))
            .map_err(plot_err)?;
    }

    if !style.x_label.is_empty() {
        let (w, h) = style.size;
        root.draw(&Text::new(
            style.x_label.clone(),
            (w as i32 / 2, h as i32 - 5),
            tick_font
                .clone()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Bottom)),
        ))
        .map_err(plot_err)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::from_values(vec![5.0, 1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.median, 3.5);
        assert_eq!(stats.q1, 2.25);
        assert_eq!(stats.q3, 4.75);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert_eq!(stats.outliers, vec![100.0]);

        assert!(BoxStats::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(thousands(0.1), "0.10");
        assert_eq!(thousands(1234.5), "1,234.50");
        assert_eq!(thousands(-1234567.891), "-1,234,567.89");
        assert_eq!(category_label(&Value::Int(1000)), "1000");
    }

    #[test]
    fn test_numeric_categories_are_sorted() {
        let mut table = Table::new(["rate"]);
        for rate in [0.5, 0.1, 0.5, 0.25] {
            table.push_row(vec![Value::Float(rate)]).unwrap();
        }
        let cats = categories(&table, "rate").unwrap();
        assert_eq!(cats, vec![Value::Float(0.1), Value::Float(0.25), Value::Float(0.5)]);
    }

    fn results() -> Table {
        let mut table = Table::new(["flake_rate", "runs", "strategy"]);
        for (rate, runs, strategy) in [
            (0.1, 10, "rerun"),
            (0.1, 12, "rerun"),
            (0.1, 3, "shuffle"),
            (0.5, 30, "rerun"),
            (0.5, 7, "shuffle"),
            (0.5, 9, "shuffle"),
        ] {
            table
                .push_row(vec![Value::Float(rate), Value::Int(runs), strategy.into()])
                .unwrap();
        }
        table
    }

    #[test]
    fn test_render_with_hue_and_log_scale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs.svg");
        let plot = BoxPlot::new("flake_rate", "runs")
            .hue("strategy")
            .log_scale(true);

        render(&results(), &plot, &ChartStyle::default().labels("rate", "runs"), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("0.10"));
        assert!(svg.contains("shuffle"));
    }

    #[test]
    fn test_render_sparse_ticks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sparse.svg");
        let plot = BoxPlot::new("flake_rate", "runs").sparse_ticks(true);

        render(&results(), &plot, &ChartStyle::default(), &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("0.10"));
        assert!(!svg.contains("0.50"));
    }
}
