//! File-backed cache of result tables.
//!
//! Each entry is one file `<root>/<name>.<extension>` holding a checksummed
//! MessagePack payload. Entries are created on first store, overwritten by
//! later stores under the same name and never removed automatically.

mod key;
mod store;

pub use key::CacheKey;
pub use store::{
    is_cached, load_cache, store_file_in_cache, CacheEntryInfo, CachedTable, ResultCache,
};
