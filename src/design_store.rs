//! The design store: saved designs, user preferences and the catalog cache.
//!
//! Each logical collection is one JSON value under one substrate key, so
//! every mutation is a read-modify-write of the whole collection. Those
//! cycles go through a single writer lock, which makes concurrent mutations
//! through the same `DesignStore` run one after another instead of losing
//! each other's changes. Reads skip the lock and see the last committed
//! write. Two stores opened on the same substrate do not share the lock.
//!
//! Reads fail soft: a missing key and unparseable text both come back as an
//! empty collection. Corruption is reported through `warn!` only.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::{Mutex, MutexGuard};

use crate::design_model::{DesignPatch, FurnitureCatalogEntry, SavedDesign, UserPreferences};
use crate::error::{Result, StoreError};
use crate::substrate::{Substrate, DESIGNS_KEY, FURNITURE_CATALOG_KEY, MANAGED_KEYS, USER_PREFERENCES_KEY};

/// Footprint of the stored design collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub count: usize,
    /// Byte length of the compact serialized collection.
    pub approximate_size_bytes: usize,
}

pub struct DesignStore<S: Substrate> {
    substrate: S,
    writer: Mutex<()>,
}

impl<S: Substrate> DesignStore<S> {
    pub fn new(substrate: S) -> Self {
        Self {
            substrate,
            writer: Mutex::new(()),
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    pub fn into_substrate(self) -> S {
        self.substrate
    }

    // --- Designs ---

    /// Appends `design` to the stored collection.
    ///
    /// Not idempotent: saving the same record twice stores two copies.
    pub fn create(&self, design: SavedDesign) -> Result<()> {
        design.validate()?;
        let _guard = self.write_lane();
        let mut designs = self.load_for_write::<Vec<SavedDesign>>(DESIGNS_KEY)?;
        debug!("Appending design '{}' after {} existing", design.id, designs.len());
        designs.push(design);
        self.store(DESIGNS_KEY, &designs)
    }

    /// All stored designs in insertion order; empty if absent or corrupt.
    pub fn list(&self) -> Vec<SavedDesign> {
        self.load_soft(DESIGNS_KEY)
    }

    /// First stored design with the given id.
    pub fn get(&self, id: &str) -> Option<SavedDesign> {
        self.list().into_iter().find(|d| d.id == id)
    }

    /// Shallow-merges `patch` into the design with this id.
    ///
    /// Unknown ids are a silent no-op. Returns whether a design was updated.
    pub fn update(&self, id: &str, patch: DesignPatch) -> Result<bool> {
        let _guard = self.write_lane();
        let mut designs = self.load_for_write::<Vec<SavedDesign>>(DESIGNS_KEY)?;

        let Some(index) = designs.iter().position(|d| d.id == id) else {
            debug!("Update skipped: no design with id '{id}'");
            return Ok(false);
        };

        let mut merged = designs[index].clone();
        patch.apply_to(&mut merged);
        merged.validate()?;
        designs[index] = merged;

        self.store(DESIGNS_KEY, &designs)?;
        Ok(true)
    }

    /// Removes every design with this id, keeping the others in order.
    ///
    /// Unknown ids still rewrite the collection and succeed. Returns the
    /// number of records removed.
    pub fn delete(&self, id: &str) -> Result<usize> {
        let _guard = self.write_lane();
        let mut designs = self.load_for_write::<Vec<SavedDesign>>(DESIGNS_KEY)?;
        let before = designs.len();
        designs.retain(|d| d.id != id);
        let removed = before - designs.len();
        self.store(DESIGNS_KEY, &designs)?;
        debug!("Deleted {removed} design(s) with id '{id}'");
        Ok(removed)
    }

    /// Pretty-printed JSON of the whole collection, accepted by [`Self::import_all`].
    pub fn export_all(&self) -> Result<String> {
        let designs = self.list();
        Ok(serde_json::to_string_pretty(&designs)?)
    }

    /// Replaces the whole collection with the designs in `text`.
    ///
    /// Destructive: nothing previously stored survives. Text that is not a
    /// JSON array of design records fails with `InvalidImportFormat`, and
    /// records breaking an invariant fail with `Validation`; in both cases
    /// the store is left as it was. Returns the number of imported designs.
    pub fn import_all(&self, text: &str) -> Result<usize> {
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| StoreError::InvalidImportFormat(format!("not valid JSON: {e}")))?;
        if !value.is_array() {
            return Err(StoreError::InvalidImportFormat(
                "expected an array of designs".to_string(),
            ));
        }
        let designs: Vec<SavedDesign> = serde_json::from_value(value)
            .map_err(|e| StoreError::InvalidImportFormat(format!("not a design record: {e}")))?;
        for design in &designs {
            design.validate()?;
        }

        let _guard = self.write_lane();
        self.store(DESIGNS_KEY, &designs)?;
        info!("Imported {} design(s)", designs.len());
        Ok(designs.len())
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let designs = self.list();
        let serialized = serde_json::to_string(&designs)?;
        Ok(StoreStats {
            count: designs.len(),
            approximate_size_bytes: serialized.len(),
        })
    }

    // --- Preferences ---

    /// Overwrites the whole preference blob.
    pub fn save_preferences(&self, preferences: &UserPreferences) -> Result<()> {
        let _guard = self.write_lane();
        self.store(USER_PREFERENCES_KEY, preferences)
    }

    /// The stored preference blob; empty if absent or corrupt.
    pub fn get_preferences(&self) -> UserPreferences {
        self.load_soft(USER_PREFERENCES_KEY)
    }

    // --- Catalog cache ---

    /// Replaces the cached catalog wholesale.
    ///
    /// Every entry is validated first; one bad entry rejects the whole
    /// refresh and keeps the previous cache.
    pub fn save_catalog(&self, entries: &[FurnitureCatalogEntry]) -> Result<()> {
        for entry in entries {
            entry.validate()?;
        }
        let _guard = self.write_lane();
        self.store(FURNITURE_CATALOG_KEY, entries)
    }

    /// The cached catalog; empty if absent or corrupt.
    pub fn get_catalog(&self) -> Vec<FurnitureCatalogEntry> {
        self.load_soft(FURNITURE_CATALOG_KEY)
    }

    // --- Maintenance ---

    /// Removes designs, preferences and the catalog cache.
    ///
    /// Atomic only if the substrate's `multi_remove` is; otherwise a failure
    /// may leave some keys behind and the call can simply be repeated.
    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lane();
        self.substrate.multi_remove(&MANAGED_KEYS).inspect_err(|e| {
            warn!("Clearing stored data failed: {e}");
        })?;
        info!("Cleared all stored data");
        Ok(())
    }

    // --- Internals ---

    fn write_lane(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load_soft<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.substrate.get_item(key) {
            Ok(raw) => parse_or_default(key, raw),
            Err(e) => {
                warn!("Reading '{key}' failed, returning empty: {e}");
                T::default()
            }
        }
    }

    /// Like `load_soft`, but a substrate failure aborts the mutation.
    fn load_for_write<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let raw = self.substrate.get_item(key).inspect_err(|e| {
            warn!("Reading '{key}' before write failed: {e}");
        })?;
        Ok(parse_or_default(key, raw))
    }

    fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.substrate.set_item(key, &json).inspect_err(|e| {
            warn!("Writing '{key}' failed: {e}");
        })
    }
}

fn parse_or_default<T: DeserializeOwned + Default>(key: &str, raw: Option<String>) -> T {
    let Some(text) = raw else {
        return T::default();
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored value under '{key}' is corrupt ({} bytes), treating as empty: {e}", text.len());
            T::default()
        }
    }
}
