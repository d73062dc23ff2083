//! Flakestat CLI command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

use crate::cache::ResultCache;
use crate::plot::{BoxPlot, ChartStyle, Distribution, Figures, LinePlot};
use crate::scoring::{label_classifier, try_compute_scores, ScoreSummary};
use crate::table::{Table, Value};
use crate::types::config::Config;
use crate::walk::{walk_folders, ExperimentDir};
use crate::FlakestatResult;

use super::{CacheCommand, PlotArgs, PlotCommand};

const CONFIG_FILE: &str = "flakestat.toml";
const CACHE_PREFIX: &str = "cache:";

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> FlakestatResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;
    update_gitignore(&target_dir, &config)?;

    println!("Flakestat initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. List experiments: flakestat walk <results root>");
    println!("  2. Score them: flakestat scores <results root> --cache scores");

    Ok(())
}

/// Adds the cache and figures directories to .gitignore.
fn update_gitignore(target_dir: &Path, config: &Config) -> FlakestatResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entries = [
        format!("{}/", config.cache.dir.display()),
        format!("{}/", config.figures.dir.display()),
    ];

    let content = if gitignore_path.exists() {
        std::fs::read_to_string(&gitignore_path)?
    } else {
        String::new()
    };

    let missing: Vec<&String> = entries
        .iter()
        .filter(|entry| {
            !content
                .lines()
                .any(|line| line.trim() == entry.as_str() || line.trim() == entry.trim_end_matches('/'))
        })
        .collect();

    if missing.is_empty() {
        tracing::debug!(".gitignore already lists the output directories");
        return Ok(());
    }

    let mut new_content = content.trim_end().to_string();
    if !new_content.is_empty() {
        new_content.push_str("\n\n");
    }
    new_content.push_str("# Flakestat - cache and figures\n");
    for entry in missing {
        new_content.push_str(entry);
        new_content.push('\n');
    }

    std::fs::write(&gitignore_path, new_content)?;
    println!(".gitignore updated");
    Ok(())
}

/// Lists experiment directories.
pub fn walk(root: &Path) -> FlakestatResult<()> {
    let experiments = walk_folders(root)?;

    if experiments.is_empty() {
        println!("No experiments found under {}", root.display());
        return Ok(());
    }

    for experiment in &experiments {
        println!("{}", experiment);
    }
    println!("\n{} experiment(s)", experiments.len());
    Ok(())
}

/// Options of the `scores` command.
#[derive(Debug, Clone, Default)]
pub struct ScoresOptions {
    pub pattern: Option<String>,
    pub label_column: Option<String>,
    pub cache: Option<String>,
    pub json: bool,
}

/// Scores every experiment below `root` and prints one row per experiment.
pub fn scores(root: &Path, options: &ScoresOptions, config: &Config) -> FlakestatResult<()> {
    let cache = ResultCache::from_config(&config.cache);

    let table = match &options.cache {
        Some(name) if cache.is_cached(name)? => {
            tracing::info!(name = %name, "Using cached scores");
            cache.load(name)?
        }
        cached => {
            let table = score_experiments(root, options, config)?;
            if let Some(name) = cached {
                let path = cache.store(&table, name)?;
                println!("Scores cached at: {}", path.display());
            }
            table
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&table.to_json_records())?);
    } else {
        print_table(&table);
    }
    Ok(())
}

fn score_experiments(
    root: &Path,
    options: &ScoresOptions,
    config: &Config,
) -> FlakestatResult<Table> {
    let pattern = Regex::new(
        options
            .pattern
            .as_deref()
            .unwrap_or(&config.results.file_pattern),
    )?;
    let label_column = options
        .label_column
        .as_deref()
        .unwrap_or(&config.results.label_column);

    let experiments = walk_folders(root)?;
    let mut table = Table::new(
        ExperimentDir::ID_COLUMNS
            .iter()
            .chain(ScoreSummary::COLUMNS.iter())
            .copied(),
    );

    let progress = ProgressBar::new(experiments.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for experiment in &experiments {
        progress.set_message(experiment.to_string());

        let results = experiment.load_results(&pattern)?;
        if results.is_empty() {
            tracing::warn!(experiment = %experiment, "No results, skipping");
            progress.inc(1);
            continue;
        }

        let summary = try_compute_scores(&results, label_classifier(label_column))?;
        tracing::debug!(experiment = %experiment, rows = summary.total(), "Scored");

        let mut row = experiment.id_values();
        row.extend(summary.to_row());
        table.push_row(row)?;
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(table)
}

fn cell(value: &Value) -> String {
    match value {
        Value::Float(f) if f.is_nan() => "n/a".to_string(),
        Value::Float(f) => format!("{:.4}", f),
        other => other.to_string(),
    }
}

/// Prints `table` as aligned text columns.
fn print_table(table: &Table) {
    if table.is_empty() {
        println!("No rows.");
        return;
    }

    let cells: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.values().iter().map(cell).collect())
        .collect();
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(table.columns().iter().map(String::as_str).collect()));
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}

/// Runs a cache subcommand.
pub fn cache(command: &CacheCommand, config: &Config) -> FlakestatResult<()> {
    let cache = ResultCache::from_config(&config.cache);

    match command {
        CacheCommand::List => {
            let entries = cache.entries()?;
            if entries.is_empty() {
                println!("Cache is empty ({})", cache.root().display());
                return Ok(());
            }
            for entry in entries {
                let stored_at = entry
                    .stored_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "corrupt".to_string());
                println!("{:<30} {:>10} B  {}", entry.name, entry.size_bytes, stored_at);
            }
        }
        CacheCommand::Status { name } => {
            if cache.is_cached(name)? {
                println!("{}: cached", name);
            } else {
                println!("{}: not cached", name);
            }
        }
        CacheCommand::Store { csv, name } => {
            let table = Table::read_csv(csv)?;
            let path = cache.store(&table, name)?;
            println!("Stored {} row(s) at: {}", table.len(), path.display());
        }
        CacheCommand::Show { name } => {
            let table = cache.load(name)?;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            table.to_csv_writer(&mut handle)?;
            handle.flush()?;
        }
    }

    Ok(())
}

/// Loads a CSV file, or a cache entry when `input` is `cache:<name>`.
fn load_input(input: &str, config: &Config) -> FlakestatResult<Table> {
    match input.strip_prefix(CACHE_PREFIX) {
        Some(name) => ResultCache::from_config(&config.cache).load(name),
        None => Table::read_csv(input),
    }
}

/// `(min, max)` from a two-value `--x-lim`/`--y-lim` option.
fn axis_limits(values: Option<&[f64]>) -> Option<(f64, f64)> {
    match values {
        Some([min, max]) => Some((*min, *max)),
        _ => None,
    }
}

fn chart_style(args: &PlotArgs, config: &Config) -> FlakestatResult<ChartStyle> {
    let mut style = ChartStyle::from_config(&config.figures)
        .labels(args.x_label.as_str(), args.y_label.as_str());
    style.x_lim = axis_limits(args.x_lim.as_deref());
    style.y_lim = axis_limits(args.y_lim.as_deref());
    style.legend = if args.no_legend {
        None
    } else {
        Some(args.legend.parse()?)
    };
    Ok(style)
}

/// Renders a chart.
pub fn plot(command: &PlotCommand, config: &Config) -> FlakestatResult<()> {
    let figures = Figures::from_config(&config.figures);

    let path = match command {
        PlotCommand::Line { common, x, y } => {
            let table = load_input(&common.input, config)?;
            let mut plot = LinePlot::new(x.as_str(), y.as_str());
            plot.hue = common.hue.clone();
            figures.lineplot(&table, &common.name, &plot, &chart_style(common, config)?)?
        }
        PlotCommand::Dist {
            common,
            column,
            binwidth,
        } => {
            let table = load_input(&common.input, config)?;
            let mut plot = Distribution::new(column.as_str());
            plot.hue = common.hue.clone();
            plot.binwidth = *binwidth;
            figures.distribution(&table, &common.name, &plot, &chart_style(common, config)?)?
        }
        PlotCommand::Box {
            common,
            x,
            y,
            log_scale,
            sparse_ticks,
        } => {
            let table = load_input(&common.input, config)?;
            let mut plot = BoxPlot::new(x.as_str(), y.as_str())
                .log_scale(*log_scale)
                .sparse_ticks(*sparse_ticks);
            plot.hue = common.hue.clone();
            figures.boxplot(&table, &common.name, &plot, &chart_style(common, config)?)?
        }
    };

    println!("Chart written to: {}", path.display());
    Ok(())
}

/// Shows the version.
pub fn version() {
    println!("flakestat {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Scores, caches and charts flaky-test experiment results");
}
