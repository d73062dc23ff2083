//! Experiment directories and their result tables.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::table::{Table, Value};
use crate::FlakestatResult;

use super::{find_files, list_dirs};

/// One `<project>/<bug id>/<flake rate>/<strategy>` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperimentDir {
    pub path: PathBuf,
    pub project: String,
    pub bug_id: String,
    pub flake_rate: String,
    pub strategy: String,
}

impl ExperimentDir {
    /// Columns identifying an experiment, in [`ExperimentDir::id_values`] order.
    pub const ID_COLUMNS: [&'static str; 4] = ["project", "bug_id", "flake_rate", "strategy"];

    /// Identifying values of the experiment.
    pub fn id_values(&self) -> Vec<Value> {
        vec![
            self.project.as_str().into(),
            self.bug_id.as_str().into(),
            self.flake_rate.as_str().into(),
            self.strategy.as_str().into(),
        ]
    }

    /// Loads every result file matching `pattern` and tags each row with the
    /// identifying columns.
    ///
    /// Returns an empty table without columns when no file matches.
    pub fn load_results(&self, pattern: &Regex) -> FlakestatResult<Table> {
        let mut combined = Table::default();
        for file in find_files(&self.path, pattern)? {
            combined.concat(Table::read_csv(&file)?)?;
        }

        if combined.columns().is_empty() {
            tracing::debug!(path = %self.path.display(), "No result files found");
            return Ok(combined);
        }

        let mut tagged = combined;
        for (column, value) in Self::ID_COLUMNS.iter().zip(self.id_values()) {
            tagged = tagged.with_constant_column(*column, value);
        }
        Ok(tagged)
    }
}

impl std::fmt::Display for ExperimentDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.project, self.bug_id, self.flake_rate, self.strategy
        )
    }
}

/// Every strategy directory four levels below `root`, in name order.
pub fn walk_folders(root: &Path) -> FlakestatResult<Vec<ExperimentDir>> {
    let mut found = Vec::new();
    for (project_dir, project) in list_dirs(root)? {
        for (bug_dir, bug_id) in list_dirs(&project_dir)? {
            for (rate_dir, flake_rate) in list_dirs(&bug_dir)? {
                for (strategy_dir, strategy) in list_dirs(&rate_dir)? {
                    found.push(ExperimentDir {
                        path: strategy_dir,
                        project: project.clone(),
                        bug_id: bug_id.clone(),
                        flake_rate: flake_rate.clone(),
                        strategy,
                    });
                }
            }
        }
    }

    tracing::debug!(root = %root.display(), experiments = found.len(), "Walked result tree");
    Ok(found)
}
