//! Integration tests for the result cache.

use flakestat::cache::{is_cached, load_cache, store_file_in_cache, ResultCache};
use flakestat::scoring::{compute_scores, Outcome, ScoreSummary};
use flakestat::table::{Table, Value};
use flakestat::FlakestatError;
use tempfile::TempDir;

fn scores_table() -> Table {
    let mut table = Table::new(ScoreSummary::COLUMNS);
    let mut all_negative = Table::new(["reporting"]);
    for _ in 0..3 {
        all_negative.push_row(vec!["TN".into()]).unwrap();
    }
    let summary = compute_scores(&all_negative, |_| Outcome::TrueNegative);
    table.push_row(summary.to_row()).unwrap();

    let mut mixed = vec![Value::Float(0.75), Value::Float(0.5), Value::Float(1.0)];
    mixed.extend([1usize, 1, 0, 2].map(Value::from));
    table.push_row(mixed).unwrap();
    table
}

#[test]
fn test_round_trip_preserves_undefined_ratios() {
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path().join("__cache__"));
    let table = scores_table();

    assert!(!cache.is_cached("scores").unwrap());
    cache.store(&table, "scores").unwrap();
    assert!(cache.is_cached("scores").unwrap());

    let loaded = cache.load("scores").unwrap();
    assert_eq!(loaded, table);
    assert!(loaded.rows().next().unwrap().get("precision").unwrap().is_missing());
}

#[test]
fn test_store_creates_nested_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b").join("__cache__");
    let cache = ResultCache::new(&root);

    let path = cache.store(&scores_table(), "nested").unwrap();
    assert_eq!(path, root.join("nested.msgpack"));
    assert!(path.is_file());
}

#[test]
fn test_repeated_store_overwrites() {
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path());

    let mut first = Table::new(["x"]);
    first.push_row(vec![Value::Int(1)]).unwrap();
    let mut second = Table::new(["x"]);
    second.push_row(vec![Value::Int(2)]).unwrap();

    cache.store(&first, "x").unwrap();
    cache.store(&second, "x").unwrap();
    assert_eq!(cache.load("x").unwrap(), second);

    cache.store(&second, "x").unwrap();
    assert_eq!(cache.load("x").unwrap(), second);
    assert_eq!(cache.entries().unwrap().len(), 1);
}

#[test]
fn test_path_escaping_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path().join("cache"));
    let table = scores_table();

    for name in ["../escape", "a/b", "a\\b", "..", ""] {
        let err = cache.store(&table, name).unwrap_err();
        assert!(
            matches!(err, FlakestatError::InvalidCacheKey(..)),
            "{:?} was accepted",
            name
        );
    }
    assert!(!dir.path().join("escape.msgpack").exists());
}

#[test]
fn test_missing_and_corrupt_entries() {
    let dir = TempDir::new().unwrap();
    let cache = ResultCache::new(dir.path());

    assert!(matches!(
        cache.load("absent"),
        Err(FlakestatError::CacheMiss(name)) if name == "absent"
    ));

    let path = cache.store(&scores_table(), "scores").unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, bytes).unwrap();

    // Existence alone still counts as cached.
    assert!(cache.is_cached("scores").unwrap());
    assert!(matches!(
        cache.load("scores"),
        Err(FlakestatError::CorruptCache(..))
    ));
    assert!(cache.entries().unwrap()[0].stored_at.is_none());
}

#[test]
fn test_default_cache_lives_in_working_directory() {
    let dir = TempDir::new().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let table = scores_table();
    let outcome = (|| -> flakestat::FlakestatResult<Table> {
        assert!(!is_cached("defaults")?);
        store_file_in_cache(&table, "defaults")?;
        assert!(is_cached("defaults")?);
        load_cache("defaults")
    })();

    std::env::set_current_dir(previous).unwrap();

    assert_eq!(outcome.unwrap(), table);
    assert!(dir.path().join("__cache__").join("defaults.msgpack").is_file());
}
