//! Flakestat command line interface.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flakestat - scores, caches and charts flaky-test detection results.
#[derive(Parser, Debug)]
#[command(name = "flakestat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "flakestat.toml")]
    pub config: PathBuf,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Writes a default configuration file.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Lists experiment directories below a results root.
    Walk {
        /// Results root (`<project>/<bug id>/<flake rate>/<strategy>`).
        root: PathBuf,
    },

    /// Computes accuracy, precision and recall per experiment.
    Scores {
        /// Results root.
        root: PathBuf,

        /// Regex selecting result files (default from config).
        #[arg(long)]
        pattern: Option<String>,

        /// Column holding TP/FP/FN/TN labels (default from config).
        #[arg(long)]
        label_column: Option<String>,

        /// Reuse or store the scores table under this cache name.
        #[arg(long)]
        cache: Option<String>,

        /// Print JSON records instead of a text table.
        #[arg(long)]
        json: bool,
    },

    /// Inspects and fills the result cache.
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Renders a chart from a CSV file or cache entry.
    #[command(subcommand)]
    Plot(PlotCommand),

    /// Shows the version.
    Version,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Lists cache entries.
    List,

    /// Reports whether an entry exists.
    Status {
        /// Entry name.
        name: String,
    },

    /// Stores a CSV file as an entry.
    Store {
        /// CSV file to store.
        csv: PathBuf,

        /// Entry name.
        name: String,
    },

    /// Prints an entry as CSV.
    Show {
        /// Entry name.
        name: String,
    },
}

/// Chart subcommands.
#[derive(Subcommand, Debug)]
pub enum PlotCommand {
    /// Mean of `y` per `x`, one line per hue.
    Line {
        #[command(flatten)]
        common: PlotArgs,

        /// X column.
        #[arg(long)]
        x: String,

        /// Y column.
        #[arg(long)]
        y: String,
    },

    /// Histogram of a column.
    Dist {
        #[command(flatten)]
        common: PlotArgs,

        /// Column to bin.
        #[arg(long)]
        column: String,

        /// Bin width (default: Sturges' rule).
        #[arg(long)]
        binwidth: Option<f64>,
    },

    /// Box plot of `y` per category of `x`.
    Box {
        #[command(flatten)]
        common: PlotArgs,

        /// Category column.
        #[arg(long)]
        x: String,

        /// Value column.
        #[arg(long)]
        y: String,

        /// Plot log10 of the values.
        #[arg(long)]
        log_scale: bool,

        /// Label every other category only.
        #[arg(long)]
        sparse_ticks: bool,
    },
}

/// Options shared by every chart.
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// CSV file, or `cache:<name>` for a cache entry.
    #[arg(short, long)]
    pub input: String,

    /// Output name; the chart is written to `<figures dir>/<name>.svg`.
    #[arg(short, long)]
    pub name: String,

    /// Column splitting the data into coloured groups.
    #[arg(long)]
    pub hue: Option<String>,

    /// X axis description.
    #[arg(long, default_value = "")]
    pub x_label: String,

    /// Y axis description.
    #[arg(long, default_value = "")]
    pub y_label: String,

    /// X axis limits.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub x_lim: Option<Vec<f64>>,

    /// Y axis limits.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    pub y_lim: Option<Vec<f64>>,

    /// Legend position, e.g. `best` or `upper left`.
    #[arg(long, default_value = "best")]
    pub legend: String,

    /// Hide the legend.
    #[arg(long)]
    pub no_legend: bool,
}
