use crate::error::{Result, StoreError};

/// Key under which the whole design collection is stored.
pub const DESIGNS_KEY: &str = "ardecor_saved_designs";
/// Key under which the user preference blob is stored.
pub const USER_PREFERENCES_KEY: &str = "ardecor_user_preferences";
/// Key under which the furniture catalog cache is stored.
pub const FURNITURE_CATALOG_KEY: &str = "ardecor_furniture_catalog";

pub const MANAGED_KEYS: [&str; 3] = [DESIGNS_KEY, USER_PREFERENCES_KEY, FURNITURE_CATALOG_KEY];

/// String-keyed persistence the design store is layered on.
///
/// Each call is atomic for its single key: a failed `set_item` must leave the
/// previous value in place. There are no transactions across keys and no
/// lookup other than by exact key.
pub trait Substrate: Send + Sync {
    /// Returns `Ok(None)` if the key has never been written or was removed.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Removes every key, attempting all of them even after a failure.
    ///
    /// Reports the first failure. Backends that can remove several keys in
    /// one transaction should override this.
    fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        let mut first_error: Option<StoreError> = None;
        for key in keys {
            if let Err(e) = self.remove_item(key) {
                log::warn!("Failed to remove key '{key}': {e}");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<S: Substrate + ?Sized> Substrate for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }

    fn multi_remove(&self, keys: &[&str]) -> Result<()> {
        (**self).multi_remove(keys)
    }
}
