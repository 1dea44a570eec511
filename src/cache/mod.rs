//! Cache addressing and storage: the content-addressed frame key, the
//! per-entry metadata, the tiled pixel payload and the in-memory
//! index.

/// Tiled pixel payload of one cache entry.
pub mod entry;
/// The content-addressed cache key for a rendered frame tile.
pub mod key;
/// Per-entry "value" metadata stored alongside a key.
pub mod params;
/// In-memory cache index with collision fallback and eviction.
pub mod store;
