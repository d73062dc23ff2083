//! Traversal of experiment result directories.
//!
//! Results are laid out as `<root>/<project>/<bug id>/<flake rate>/<strategy>/`,
//! with one or more CSV result files in each strategy directory.

mod experiment;

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::FlakestatResult;

pub use experiment::{walk_folders, ExperimentDir};

/// Subdirectories of `path` as `(full path, name)`, sorted by name.
pub fn list_dirs(path: &Path) -> FlakestatResult<Vec<(PathBuf, String)>> {
    list_entries(path, |p| p.is_dir())
}

/// Regular files of `path` as `(full path, name)`, sorted by name.
pub fn list_files(path: &Path) -> FlakestatResult<Vec<(PathBuf, String)>> {
    list_entries(path, |p| p.is_file())
}

fn list_entries<F>(path: &Path, keep: F) -> FlakestatResult<Vec<(PathBuf, String)>>
where
    F: Fn(&Path) -> bool,
{
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let full = entry.path();
        if !keep(&full) {
            continue;
        }
        // Names that are not valid UTF-8 cannot be matched against patterns.
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %full.display(), "Skipping non UTF-8 entry");
            continue;
        };
        entries.push((full, name));
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(entries)
}

/// Whether `pattern` matches at the start of `name`.
fn matches_from_start(pattern: &Regex, name: &str) -> bool {
    pattern.find(name).is_some_and(|m| m.start() == 0)
}

/// Subdirectories of `path` whose name matches `pattern` from its first character.
pub fn find_dirs(path: &Path, pattern: &Regex) -> FlakestatResult<Vec<(PathBuf, String)>> {
    Ok(list_dirs(path)?
        .into_iter()
        .filter(|(_, name)| matches_from_start(pattern, name))
        .collect())
}

/// Files of `path` whose name matches `pattern` from its first character.
pub fn find_files(path: &Path, pattern: &Regex) -> FlakestatResult<Vec<PathBuf>> {
    Ok(list_files(path)?
        .into_iter()
        .filter(|(_, name)| matches_from_start(pattern, name))
        .map(|(full, _)| full)
        .collect())
}

/// Directory holding the results of one strategy run.
///
/// A single trailing separator on `root` is removed before the segments are
/// joined with `/`, so a root of `/` stays absolute. The joined path is then
/// normalised lexically: `.` components are dropped and `..` cancels the
/// preceding normal component (and is dropped right after the root).
pub fn result_folder(
    root: &str,
    project: &str,
    bug_id: &str,
    flake_rate: &str,
    strategy: &str,
) -> PathBuf {
    let root = root
        .strip_suffix('/')
        .or_else(|| root.strip_suffix('\\'))
        .unwrap_or(root);

    let joined = format!(
        "{}/{}/{}/{}/{}",
        root, project, bug_id, flake_rate, strategy
    );

    let mut normal: Vec<Component<'_>> = Vec::new();
    for component in Path::new(&joined).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normal.last() {
                Some(Component::Normal(_)) => {
                    normal.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normal.push(component),
            },
            other => normal.push(other),
        }
    }

    if normal.is_empty() {
        return PathBuf::from(".");
    }
    normal.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout() -> TempDir {
        let dir = TempDir::new().unwrap();
        for sub in ["beta", "alpha", "alpha2", "skip"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        for file in ["results_1.csv", "results_0.csv", "notes.txt", "old_results.csv"] {
            std::fs::write(dir.path().join(file), "a\n1\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_list_dirs_sorted() {
        let dir = layout();
        let names: Vec<String> = list_dirs(dir.path())
            .unwrap()
            .into_iter()
            .map(|(_, n)| n)
            .collect();
        assert_eq!(names, vec!["alpha", "alpha2", "beta", "skip"]);
    }

    #[test]
    fn test_list_files_excludes_dirs() {
        let dir = layout();
        let files = list_files(dir.path()).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|(p, _)| p.is_file()));
    }

    #[test]
    fn test_find_is_anchored_at_start() {
        let dir = layout();

        let pattern = Regex::new(r"results_\d+\.csv").unwrap();
        let files = find_files(dir.path(), &pattern).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["results_0.csv", "results_1.csv"]);

        let pattern = Regex::new("alpha").unwrap();
        let dirs = find_dirs(dir.path(), &pattern).unwrap();
        assert_eq!(dirs.len(), 2);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(list_dirs(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_result_folder() {
        assert_eq!(
            result_folder("results/", "lang", "17", "0.1", "rerun"),
            PathBuf::from("results/lang/17/0.1/rerun")
        );
        assert_eq!(
            result_folder("./results", "lang", "17", "0.1", "rerun"),
            PathBuf::from("results/lang/17/0.1/rerun")
        );
    }

    #[test]
    fn test_result_folder_at_filesystem_root() {
        assert_eq!(
            result_folder("/", "lang", "17", "0.1", "rerun"),
            PathBuf::from("/lang/17/0.1/rerun")
        );
        assert_eq!(
            result_folder("", "lang", "17", "0.1", "rerun"),
            PathBuf::from("/lang/17/0.1/rerun")
        );
    }

    #[test]
    fn test_result_folder_collapses_parent_dirs() {
        assert_eq!(
            result_folder("results/../other", "lang", "17", "0.1", "rerun"),
            PathBuf::from("other/lang/17/0.1/rerun")
        );
        assert_eq!(
            result_folder("../results/", "lang", "17", "0.1", "rerun"),
            PathBuf::from("../results/lang/17/0.1/rerun")
        );
        assert_eq!(
            result_folder("/../data", "lang", "17", "0.1", "rerun"),
            PathBuf::from("/data/lang/17/0.1/rerun")
        );
    }
}
