//! Statistical charts rendered to SVG.
//!
//! Charts are written to `<figures dir>/<name>.svg`. Every chart takes a
//! [`Table`](crate::table::Table), the columns to plot and a [`ChartStyle`]
//! with labels, limits, size and legend placement.

mod boxplot;
mod distribution;
mod line;
mod palette;
mod style;

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::table::Table;
use crate::types::config::FiguresConfig;
use crate::{FlakestatError, FlakestatResult};

pub use boxplot::BoxPlot;
pub use distribution::Distribution;
pub use line::LinePlot;
pub use palette::color_palette;
pub use style::{ChartStyle, LegendPosition};

const EXTENSION: &str = "svg";

/// Output directory for charts.
#[derive(Debug, Clone)]
pub struct Figures {
    dir: PathBuf,
}

impl Default for Figures {
    fn default() -> Self {
        Self::from_config(&FiguresConfig::default())
    }
}

impl Figures {
    /// Writes charts into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the configured figures directory.
    pub fn from_config(config: &FiguresConfig) -> Self {
        Self::new(config.dir.clone())
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a chart named `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, EXTENSION))
    }

    fn prepare(&self, name: &str) -> FlakestatResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(FlakestatError::plot(format!("invalid chart name '{}'", name)));
        }
        std::fs::create_dir_all(&self.dir)?;
        Ok(self.path_for(name))
    }

    /// Renders a line chart.
    pub fn lineplot(
        &self,
        table: &Table,
        name: &str,
        plot: &LinePlot,
        style: &ChartStyle,
    ) -> FlakestatResult<PathBuf> {
        let path = self.prepare(name)?;
        line::render(table, plot, style, &path)?;
        tracing::info!(path = %path.display(), "Line plot written");
        Ok(path)
    }

    /// Renders a histogram.
    pub fn distribution(
        &self,
        table: &Table,
        name: &str,
        plot: &Distribution,
        style: &ChartStyle,
    ) -> FlakestatResult<PathBuf> {
        let path = self.prepare(name)?;
        distribution::render(table, plot, style, &path)?;
        tracing::info!(path = %path.display(), "Distribution written");
        Ok(path)
    }

    /// Renders a box plot.
    pub fn boxplot(
        &self,
        table: &Table,
        name: &str,
        plot: &BoxPlot,
        style: &ChartStyle,
    ) -> FlakestatResult<PathBuf> {
        let path = self.prepare(name)?;
        boxplot::render(table, plot, style, &path)?;
        tracing::info!(path = %path.display(), "Box plot written");
        Ok(path)
    }
}

/// Converts a drawing backend error.
fn plot_err<E: std::fmt::Display>(e: E) -> FlakestatError {
    FlakestatError::plot(e.to_string())
}

/// Row groups for an optional hue column. Without a hue every row is in a
/// single unlabelled group.
fn hue_groups(table: &Table, hue: Option<&str>) -> FlakestatResult<Vec<(Option<String>, Vec<usize>)>> {
    match hue {
        Some(column) => Ok(table
            .group_indices(column)?
            .into_iter()
            .map(|(value, rows)| (Some(value.to_string()), rows))
            .collect()),
        None => Ok(vec![(None, (0..table.len()).collect())]),
    }
}

/// Axis range from explicit limits or from the data with 5% padding.
fn axis_range<I>(values: I, limits: Option<(f64, f64)>) -> FlakestatResult<Range<f64>>
where
    I: IntoIterator<Item = f64>,
{
    if let Some((lo, hi)) = limits {
        if lo.is_finite() && hi.is_finite() && lo < hi {
            return Ok(lo..hi);
        }
        return Err(FlakestatError::plot(format!("invalid axis limits ({}, {})", lo, hi)));
    }

    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return Err(FlakestatError::plot("no numeric data to plot"));
    }
    if min == max {
        return Ok(min - 0.5..max + 0.5);
    }

    let pad = (max - min) * 0.05;
    Ok(min - pad..max + pad)
}
