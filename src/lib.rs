//! # Flakestat
//!
//! Scoring, caching and charting for flaky-test detection experiments.
//!
//! Experiment results are CSV tables laid out as
//! `<root>/<project>/<bug id>/<flake rate>/<strategy>/results*.csv`. Every row
//! is one detection outcome, labelled as a true/false positive/negative.
//! Flakestat walks those directories, aggregates outcomes into accuracy,
//! precision and recall, caches derived tables on disk and renders charts.
//!
//! ## Modules
//!
//! - [`table`] - In-memory result tables and CSV I/O
//! - [`scoring`] - Confusion counts and derived ratios
//! - [`cache`] - On-disk cache of derived tables
//! - [`walk`] - Experiment directory traversal
//! - [`plot`] - SVG line, histogram and box charts
//! - [`cli`] - Command line interface
//! - [`types`] - Configuration and errors

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod plot;
pub mod scoring;
pub mod table;
pub mod types;
pub mod walk;

pub use types::config::Config;
pub use types::errors::{FlakestatError, FlakestatResult};
