//! On-disk storage of cached tables.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::table::Table;
use crate::types::config::CacheConfig;
use crate::{FlakestatError, FlakestatResult};

use super::CacheKey;

const MAGIC: &[u8; 4] = b"FLKC";
const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = MAGIC.len() + 1 + 32;

/// Payload of a cache file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTable {
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,

    /// Cached table.
    pub table: Table,
}

/// Summary of an existing cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntryInfo {
    /// Entry name.
    pub name: String,

    /// Backing file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size_bytes: u64,

    /// Write time recorded in the entry; `None` when the file is corrupt.
    pub stored_at: Option<DateTime<Utc>>,
}

/// Cache of tables keyed by name, one file per entry.
#[derive(Debug, Clone)]
pub struct ResultCache {
    root: PathBuf,
    extension: String,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl ResultCache {
    /// Creates a cache rooted at `root` with the default extension.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: CacheConfig::default().extension,
        }
    }

    /// Creates a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            root: config.dir.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Overrides the file extension of entries.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Backing file of an entry.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, self.extension))
    }

    /// Whether a backing file exists for `name`. The content is not checked.
    pub fn is_cached(&self, name: &str) -> FlakestatResult<bool> {
        let key = CacheKey::new(name)?;
        Ok(self.path_for(&key).is_file())
    }

    /// Stores `table` under `name`, replacing any previous entry.
    ///
    /// The cache root is created first, including missing parents.
    pub fn store(&self, table: &Table, name: &str) -> FlakestatResult<PathBuf> {
        let key = CacheKey::new(name)?;
        std::fs::create_dir_all(&self.root)?;

        let entry = CachedTable {
            stored_at: Utc::now(),
            table: table.clone(),
        };
        let bytes = encode(&entry)?;

        let path = self.path_for(&key);
        std::fs::write(&path, &bytes)?;

        tracing::info!(
            name = %key,
            path = %path.display(),
            rows = table.len(),
            bytes = bytes.len(),
            "Table cached"
        );

        Ok(path)
    }

    /// Loads the table stored under `name`.
    pub fn load(&self, name: &str) -> FlakestatResult<Table> {
        Ok(self.load_entry(name)?.table)
    }

    /// Loads the full entry stored under `name`.
    pub fn load_entry(&self, name: &str) -> FlakestatResult<CachedTable> {
        let key = CacheKey::new(name)?;
        let path = self.path_for(&key);

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FlakestatError::CacheMiss(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let entry = decode(key.as_str(), &bytes)?;
        tracing::debug!(name = %key, rows = entry.table.len(), "Cache entry loaded");
        Ok(entry)
    }

    /// Lists existing entries, sorted by name. A missing root yields no entries.
    pub fn entries(&self) -> FlakestatResult<Vec<CacheEntryInfo>> {
        let dir = match std::fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item?;
            let path = item.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            let size_bytes = item.metadata()?.len();
            let stored_at = std::fs::read(&path)
                .ok()
                .and_then(|bytes| decode(&name, &bytes).ok())
                .map(|entry| entry.stored_at);

            entries.push(CacheEntryInfo {
                name,
                path,
                size_bytes,
                stored_at,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

fn encode(entry: &CachedTable) -> FlakestatResult<Vec<u8>> {
    let payload = rmp_serde::to_vec(entry)?;
    let checksum = Sha256::digest(&payload);

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&checksum);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode(name: &str, bytes: &[u8]) -> FlakestatResult<CachedTable> {
    let corrupt = |reason: String| FlakestatError::CorruptCache(name.to_string(), reason);

    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(corrupt("missing cache header".to_string()));
    }

    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unsupported format version {}", version)));
    }

    let (expected, payload) = bytes[MAGIC.len() + 1..].split_at(32);
    let actual = Sha256::digest(payload);
    if actual.as_slice() != expected {
        return Err(corrupt(format!(
            "checksum mismatch (expected {}, found {})",
            hex::encode(expected),
            hex::encode(actual)
        )));
    }

    rmp_serde::from_slice(payload).map_err(|e| corrupt(e.to_string()))
}

/// Whether `name` is cached in the default cache (`__cache__/`).
pub fn is_cached(name: &str) -> FlakestatResult<bool> {
    ResultCache::default().is_cached(name)
}

/// Stores `table` under `name` in the default cache.
pub fn store_file_in_cache(table: &Table, name: &str) -> FlakestatResult<()> {
    ResultCache::default().store(table, name).map(|_| ())
}

/// Loads `name` from the default cache.
pub fn load_cache(name: &str) -> FlakestatResult<Table> {
    ResultCache::default().load(name)
}
