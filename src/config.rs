//! Configuration for AtlasDict
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default offset slots preallocated for a fresh list
pub const DEFAULT_INDEX_CAPACITY: u64 = 1024 * 1024;

/// Main configuration for opening a dict file
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // File Configuration
    // -------------------------------------------------------------------------
    /// Path of the single file backing the dict
    pub path: PathBuf,

    /// Map the file read-only for serving (no `add`/`put`/`commit`)
    pub readonly: bool,

    /// Initial size of the writable mapping (in bytes). The mapping doubles
    /// whenever an append would overflow it.
    pub reserved_space_bytes: u64,

    /// Discard existing contents when opening writable
    pub truncate: bool,

    // -------------------------------------------------------------------------
    // List Configuration
    // -------------------------------------------------------------------------
    /// Offset slots preallocated for a fresh list
    pub initial_index_capacity: u64,

    // -------------------------------------------------------------------------
    // Keyed Dict Configuration
    // -------------------------------------------------------------------------
    /// Expected number of keys, used to size the bucket table
    pub max_elements: u64,

    /// Target keys per bucket
    pub max_load_factor: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./atlasdict.rdict"),
            readonly: false,
            reserved_space_bytes: 64 * 1024 * 1024, // 64 MB
            truncate: false,
            initial_index_capacity: DEFAULT_INDEX_CAPACITY,
            max_elements: 1024 * 1024,
            max_load_factor: 0.75,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Bucket count derived from `max_elements / max_load_factor`, at least 1
    pub fn bucket_count(&self) -> u64 {
        let buckets = (self.max_elements as f64 / self.max_load_factor).ceil();
        if buckets.is_finite() && buckets >= 1.0 {
            buckets as u64
        } else {
            1
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the dict file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Open read-only (serving) or writable (building)
    pub fn readonly(mut self, readonly: bool) -> Self {
        self.config.readonly = readonly;
        self
    }

    /// Set the initial writable mapping size (in bytes)
    pub fn reserved_space_bytes(mut self, bytes: u64) -> Self {
        self.config.reserved_space_bytes = bytes;
        self
    }

    /// Discard existing contents when opening writable
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.config.truncate = truncate;
        self
    }

    /// Set the number of offset slots preallocated for a fresh list
    pub fn initial_index_capacity(mut self, slots: u64) -> Self {
        self.config.initial_index_capacity = slots;
        self
    }

    /// Set the expected number of keys
    pub fn max_elements(mut self, count: u64) -> Self {
        self.config.max_elements = count;
        self
    }

    /// Set the target keys per bucket
    pub fn max_load_factor(mut self, factor: f64) -> Self {
        self.config.max_load_factor = factor;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
