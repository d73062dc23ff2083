//! Shared chart settings.

use std::str::FromStr;

use plotters::prelude::SeriesLabelPosition;

use crate::types::config::FiguresConfig;
use crate::FlakestatError;

/// Where the legend is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    /// Let the chart decide (upper right).
    Best,
    UpperLeft,
    UpperCenter,
    UpperRight,
    CenterLeft,
    Center,
    CenterRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

impl LegendPosition {
    pub(crate) fn series_label_position(self) -> SeriesLabelPosition {
        match self {
            LegendPosition::Best | LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPosition::UpperCenter => SeriesLabelPosition::UpperMiddle,
            LegendPosition::CenterLeft => SeriesLabelPosition::MiddleLeft,
            LegendPosition::Center => SeriesLabelPosition::MiddleMiddle,
            LegendPosition::CenterRight => SeriesLabelPosition::MiddleRight,
            LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPosition::LowerCenter => SeriesLabelPosition::LowerMiddle,
            LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

impl FromStr for LegendPosition {
    type Err = FlakestatError;

    /// Accepts matplotlib-style names such as `best` or `upper left`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "best" => Ok(LegendPosition::Best),
            "upper left" => Ok(LegendPosition::UpperLeft),
            "upper center" => Ok(LegendPosition::UpperCenter),
            "upper right" => Ok(LegendPosition::UpperRight),
            "center left" => Ok(LegendPosition::CenterLeft),
            "center" => Ok(LegendPosition::Center),
            "center right" | "right" => Ok(LegendPosition::CenterRight),
            "lower left" => Ok(LegendPosition::LowerLeft),
            "lower center" => Ok(LegendPosition::LowerCenter),
            "lower right" => Ok(LegendPosition::LowerRight),
            _ => Err(FlakestatError::plot(format!("unknown legend position '{}'", s))),
        }
    }
}

/// Labels, limits and layout shared by all charts.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub x_label: String,
    pub y_label: String,
    pub x_lim: Option<(f64, f64)>,
    pub y_lim: Option<(f64, f64)>,
    /// Width and height in pixels.
    pub size: (u32, u32),
    pub font_size: u32,
    /// `None` hides the legend.
    pub legend: Option<LegendPosition>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::from_config(&FiguresConfig::default())
    }
}

impl ChartStyle {
    /// Style with the configured size and font.
    pub fn from_config(config: &FiguresConfig) -> Self {
        Self {
            x_label: String::new(),
            y_label: String::new(),
            x_lim: None,
            y_lim: None,
            size: (config.width, config.height),
            font_size: config.font_size,
            legend: Some(LegendPosition::Best),
        }
    }

    /// Sets both axis descriptions.
    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    /// Font used for descriptions, tick labels and legends.
    pub(crate) fn font(&self) -> (&'static str, f64) {
        ("sans-serif", f64::from(self.font_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_names() {
        assert_eq!("best".parse::<LegendPosition>().unwrap(), LegendPosition::Best);
        assert_eq!(
            "Upper Left".parse::<LegendPosition>().unwrap(),
            LegendPosition::UpperLeft
        );
        assert_eq!(
            "lower_right".parse::<LegendPosition>().unwrap(),
            LegendPosition::LowerRight
        );
        assert!("somewhere".parse::<LegendPosition>().is_err());
    }

    #[test]
    fn test_style_from_config() {
        let config = FiguresConfig {
            width: 800,
            font_size: 12,
            ..FiguresConfig::default()
        };
        let style = ChartStyle::from_config(&config).labels("flake rate", "accuracy");
        assert_eq!(style.size, (800, 400));
        assert_eq!(style.font(), ("sans-serif", 12.0));
        assert_eq!(style.y_label, "accuracy");
        assert_eq!(style.legend, Some(LegendPosition::Best));
    }
}
