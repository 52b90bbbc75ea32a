use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, StoreError};

const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

/// Where and how the LMDB environment is opened.
///
/// The host may pass this as JSON, e.g. `{"name": "ardecor"}`; missing
/// fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path prefix of the database; the environment lives in `<name>.lmdb`.
    pub name: String,
    /// Upper bound on the memory map, in bytes.
    pub map_size: usize,
    pub max_dbs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "ardecor".to_string(),
            map_size: DEFAULT_MAP_SIZE,
            max_dbs: DEFAULT_MAX_DBS,
        }
    }
}

impl StoreConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Config("database name must not be empty".to_string()));
        }
        if self.map_size == 0 {
            return Err(StoreError::Config("map_size must be greater than zero".to_string()));
        }
        if self.max_dbs == 0 {
            return Err(StoreError::Config("max_dbs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn lmdb_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}.lmdb", self.name))
    }
}
