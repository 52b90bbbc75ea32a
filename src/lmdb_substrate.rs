//! Durable substrate backed by an LMDB environment.
//!
//! All three managed keys live in one named database inside `<name>.lmdb`.
//! Every `set_item` is its own write transaction, so a failed write leaves
//! the previously committed value untouched.

use lmdb::{Database, DatabaseFlags, Environment, Error as LmdbError, Transaction, WriteFlags};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::substrate::Substrate;

const DB_NAME: &str = "ardecor";

pub struct LmdbSubstrate {
    env: Environment,
    db: Database,
    path: PathBuf,
}

impl LmdbSubstrate {
    /// Opens (creating if needed) `<name>.lmdb` with default settings.
    pub fn init(name: impl Into<String>) -> Result<Self> {
        Self::open(&StoreConfig::new(name))
    }

    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        let path = config.lmdb_dir();

        if path.exists() {
            info!("Opening existing database at: {}", path.display());
        } else {
            info!("Creating new database at: {}", path.display());
            fs::create_dir_all(&path).map_err(|e| {
                StoreError::Config(format!("cannot create {}: {e}", path.display()))
            })?;
        }

        let env = Environment::new()
            .set_max_dbs(config.max_dbs)
            .set_map_size(config.map_size)
            .open(&path)
            .inspect_err(|e| open_failed(&path, e))?;

        let db = env
            .create_db(Some(DB_NAME), DatabaseFlags::empty())
            .inspect_err(|e| open_failed(&path, e))?;

        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes committed data to disk.
    pub fn sync(&self) -> Result<()> {
        self.env.sync(true).map_err(StoreError::write)
    }
}

fn open_failed(path: &Path, err: &LmdbError) {
    warn!("Failed to open LMDB environment at {}: {err}", path.display());
}

impl Substrate for LmdbSubstrate {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let txn = self.env.begin_ro_txn().map_err(StoreError::read)?;
        let value = match txn.get(self.db, &key) {
            Ok(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => Some(text.to_owned()),
                // Non-UTF-8 values count as corrupt, the same as absent.
                Err(e) => {
                    warn!("Value under '{key}' is not UTF-8 ({} bytes), treating as empty: {e}", bytes.len());
                    None
                }
            },
            Err(LmdbError::NotFound) => None,
            Err(e) => return Err(StoreError::read(e)),
        };
        txn.abort();
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut txn = self.env.begin_rw_txn().map_err(StoreError::write)?;
        txn.put(self.db, &key, &value, WriteFlags::empty())
            .map_err(StoreError::write)?;
        txn.commit().map_err(StoreError::write)?;
        debug!("Wrote {} bytes to '{key}'", value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.multi_remove(&[key])
    }

    /// Removes all keys in a single write transaction.
    fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut txn = self.env.begin_rw_txn().map_err(StoreError::write)?;
        for key in keys {
            match txn.del(self.db, key, None) {
                Ok(()) | Err(LmdbError::NotFound) => {}
                Err(e) => return Err(StoreError::write(e)),
            }
        }
        txn.commit().map_err(StoreError::write)
    }
}

impl Drop for LmdbSubstrate {
    fn drop(&mut self) {
        if let Err(e) = self.env.sync(true) {
            warn!("Failed to sync {} on close: {e}", self.path.display());
        } else {
            info!("Database at {} closed", self.path.display());
        }
    }
}
