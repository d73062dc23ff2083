//! Validated cache entry names.

use std::str::FromStr;

use crate::{FlakestatError, FlakestatResult};

/// Name of a cache entry that is safe to use as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Validates `name`.
    ///
    /// Empty names, `.`, `..` and names containing `/`, `\` or NUL are
    /// rejected so that an entry can never resolve outside the cache root.
    pub fn new(name: impl Into<String>) -> FlakestatResult<Self> {
        let name = name.into();

        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name == "." || name == ".." {
            Some("name is a relative path component")
        } else if name.contains(['/', '\\']) {
            Some("name contains a path separator")
        } else if name.contains('\0') {
            Some("name contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(FlakestatError::InvalidCacheKey(name, reason.to_string())),
            None => Ok(Self(name)),
        }
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CacheKey {
    type Err = FlakestatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
