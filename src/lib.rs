//! # ARDecor Core
//!
//! Local persistence for the ARDecor mobile app: saved furniture designs,
//! user preferences and the furniture catalog cache, stored on-device in an
//! LMDB environment and exposed to the app shell over a C-compatible FFI.
//!
//! ## Layers
//!
//! - [`design_model`] - record schema and validation
//! - [`substrate`] - the string-keyed storage trait, with
//!   [`lmdb_substrate::LmdbSubstrate`] and [`memory_substrate::MemorySubstrate`]
//! - [`design_store::DesignStore`] - create/list/update/delete/export/import/stats
//!   over one substrate
//! - the `extern "C"` functions below - what the app shell calls
//!
//! ## Quick Start
//!
//! ```rust
//! use ardecor_core::design_model::DesignPatch;
//! use ardecor_core::design_store::DesignStore;
//! use ardecor_core::memory_substrate::MemorySubstrate;
//!
//! let store = DesignStore::new(MemorySubstrate::new());
//! assert!(store.list().is_empty());
//! assert!(!store.update("missing", DesignPatch::rename("x")).unwrap());
//! ```
//!
//! ## FFI Functions
//!
//! Every function returns a NUL-terminated JSON [`app_response::AppResponse`]
//! that must be released with [`free_response`]:
//!
//! - [`create_design_store`] / [`create_design_store_with_config`] - open a handle
//! - [`save_design`], [`list_designs`], [`get_design`], [`update_design`], [`delete_design`]
//! - [`export_designs`], [`import_designs`], [`design_stats`]
//! - [`save_preferences`], [`get_preferences`]
//! - [`save_furniture_catalog`], [`get_furniture_catalog`]
//! - [`clear_all_data`], [`close_design_store`]
//!
//! Mutating calls on one handle are serialized internally. The handle must
//! not be used after [`close_design_store`].

pub mod app_response;
pub mod catalog;
pub mod config;
pub mod design_model;
pub mod design_store;
pub mod error;
pub mod lmdb_substrate;
pub mod memory_substrate;
pub mod placement;
pub mod substrate;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use log::{info, warn};
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::config::StoreConfig;
use crate::design_model::{DesignPatch, FurnitureCatalogEntry, SavedDesign, UserPreferences};
use crate::design_store::DesignStore;
use crate::lmdb_substrate::LmdbSubstrate;

/// The store type handed across the C boundary.
pub type DesignStoreHandle = DesignStore<LmdbSubstrate>;

/// Opens (or creates) the store at `<name>.lmdb` with default settings.
///
/// # Parameters
///
/// * `name` - Null-terminated C string; the path stem of the LMDB directory
///
/// # Returns
///
/// A handle to pass to every other function, or null if `name` is null,
/// not UTF-8, empty, or the environment cannot be opened.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string. LMDB allows one
/// open environment per directory in a process: close the previous handle
/// with [`close_design_store`] before opening the same name again, e.g.
/// across a Flutter hot restart. Opening it twice while the first handle is
/// alive is undefined behavior at the LMDB level.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use ardecor_core::{create_design_store, close_design_store, free_response};
///
/// let name = CString::new("ardecor").unwrap();
/// let handle = create_design_store(name.as_ptr());
/// if !handle.is_null() {
///     free_response(close_design_store(handle) as *mut _);
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_design_store(name: *const c_char) -> *mut DesignStoreHandle {
    if name.is_null() {
        warn!("Null name pointer passed to create_design_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    open_store(&StoreConfig::new(name_str))
}

/// Opens the store described by a JSON [`StoreConfig`].
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON object, e.g. `{"name":"ardecor","map_size":10485760}`
///
/// # Returns
///
/// A handle, or null on a malformed config or if the environment cannot be opened.
///
/// # Safety
///
/// `config_json` must be null or point to a NUL-terminated string. The same
/// one-environment-per-directory rule as [`create_design_store`] applies.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_design_store_with_config(config_json: *const c_char) -> *mut DesignStoreHandle {
    if config_json.is_null() {
        warn!("Null config pointer passed to create_design_store_with_config");
        return std::ptr::null_mut();
    }

    let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in config parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match serde_json::from_str::<StoreConfig>(json) {
        Ok(config) => open_store(&config),
        Err(e) => {
            warn!("Invalid store config: {e}");
            std::ptr::null_mut()
        }
    }
}

fn open_store(config: &StoreConfig) -> *mut DesignStoreHandle {
    match LmdbSubstrate::open(config) {
        Ok(substrate) => {
            info!("✅ Design store opened at {}", substrate.path().display());
            Box::into_raw(Box::new(DesignStore::new(substrate)))
        }
        Err(e) => {
            warn!("❌ Failed to open design store '{}': {e}", config.name);
            std::ptr::null_mut()
        }
    }
}

/// Appends a design, given as a JSON [`SavedDesign`].
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_design_store`]
/// * `json_ptr` - Null-terminated JSON design; it must already carry its id
///
/// # Returns
///
/// `Ok` with the stored record, `ValidationError` if it breaks a record
/// invariant, `SerializationError` for malformed JSON, or `DatabaseError`
/// if the write failed. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `json_ptr` must be null or point to a NUL-terminated string.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use ardecor_core::{create_design_store, free_response, save_design};
///
/// let name = CString::new("ardecor").unwrap();
/// let handle = create_design_store(name.as_ptr());
/// let design = CString::new(r#"{"id":"design_1","name":"Living room","date":"2024-01-15T10:30:00.000Z",
///     "thumbnail":"","furniture":[],"roomDimensions":{"width":4,"height":2.7,"depth":5}}"#).unwrap();
/// free_response(save_design(handle, design.as_ptr()) as *mut _);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_design(state: *mut DesignStoreHandle, json_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(state, "save_design") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let design: SavedDesign = match serde_json::from_str(&json_str) {
        Ok(d) => d,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid design JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let stored = design.clone();
    match store.create(design) {
        Ok(()) => json_response(&stored),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Lists all designs, in insertion order.
///
/// # Returns
///
/// `Ok` with a JSON array; `[]` when nothing is stored or the stored text
/// is corrupt. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn list_designs(state: *mut DesignStoreHandle) -> *const c_char {
    match store_ref(state, "list_designs") {
        Ok(store) => json_response(&store.list()),
        Err(err) => err,
    }
}

/// Looks up one design by id.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_design_store`]
/// * `id` - Null-terminated design id
///
/// # Returns
///
/// `Ok` with the design JSON, or `NotFound`. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `id` must be null or point to a NUL-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_design(state: *mut DesignStoreHandle, id: *const c_char) -> *const c_char {
    let store = match store_ref(state, "get_design") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match store.get(&id_str) {
        Some(design) => json_response(&design),
        None => {
            let error = AppResponse::NotFound(format!("No design found with id: {id_str}"));
            response_to_c_string(&error)
        }
    }
}

/// Merges a JSON [`DesignPatch`] into the design with this id.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_design_store`]
/// * `id` - Null-terminated design id
/// * `patch_ptr` - Null-terminated JSON patch; absent fields are left alone
///
/// # Returns
///
/// `Ok("true")` after a merge and `Ok("false")` for an unknown id, which is
/// not an error. `ValidationError` if the merged record is invalid.
/// The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `id` and `patch_ptr` must be null or point to NUL-terminated strings.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn update_design(
    state: *mut DesignStoreHandle,
    id: *const c_char,
    patch_ptr: *const c_char,
) -> *const c_char {
    let store = match store_ref(state, "update_design") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    let patch_str = match c_ptr_to_string(patch_ptr, "patch") {
        Ok(patch) => patch,
        Err(err) => return err,
    };

    let patch: DesignPatch = match serde_json::from_str(&patch_str) {
        Ok(p) => p,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid patch JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match store.update(&id_str, patch) {
        Ok(updated) => response_to_c_string(&AppResponse::success(updated.to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Deletes every design with this id.
///
/// # Returns
///
/// `Ok` with the number removed; unknown ids succeed with zero.
/// The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `id` must be null or point to a NUL-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_design(state: *mut DesignStoreHandle, id: *const c_char) -> *const c_char {
    let store = match store_ref(state, "delete_design") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match store.delete(&id_str) {
        Ok(removed) => response_to_c_string(&AppResponse::success(format!("{removed} design(s) deleted"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Exports every design as pretty-printed JSON.
///
/// # Returns
///
/// `Ok` with text accepted by [`import_designs`]. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn export_designs(state: *mut DesignStoreHandle) -> *const c_char {
    let store = match store_ref(state, "export_designs") {
        Ok(store) => store,
        Err(err) => return err,
    };

    match store.export_all() {
        Ok(text) => response_to_c_string(&AppResponse::success(text)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Replaces every stored design with the ones in the export text.
///
/// # Parameters
///
/// * `state` - Handle returned by [`create_design_store`]
/// * `text_ptr` - Null-terminated JSON array of designs
///
/// # Returns
///
/// `Ok` with the imported count, `InvalidFormat` if the text is not an
/// array of designs, or `ValidationError`. On error nothing is replaced.
/// The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `text_ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn import_designs(state: *mut DesignStoreHandle, text_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(state, "import_designs") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let text = match c_ptr_to_string(text_ptr, "import text") {
        Ok(text) => text,
        Err(err) => return err,
    };

    match store.import_all(&text) {
        Ok(count) => response_to_c_string(&AppResponse::success(format!("{count} design(s) imported"))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Counts the stored designs and measures their serialized size.
///
/// # Returns
///
/// `Ok` with `{"count":..,"approximateSizeBytes":..}`. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn design_stats(state: *mut DesignStoreHandle) -> *const c_char {
    let store = match store_ref(state, "design_stats") {
        Ok(store) => store,
        Err(err) => return err,
    };

    match store.stats() {
        Ok(stats) => json_response(&stats),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Overwrites the preference blob with a JSON object.
///
/// # Returns
///
/// `Ok`, or `SerializationError` if the input is not a JSON object.
/// The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `json_ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_preferences(state: *mut DesignStoreHandle, json_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(state, "save_preferences") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let preferences: UserPreferences = match serde_json::from_str(&json_str) {
        Ok(p) => p,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Preferences must be a JSON object: {e}"));
            return response_to_c_string(&error);
        }
    };

    match store.save_preferences(&preferences) {
        Ok(()) => response_to_c_string(&AppResponse::success("Preferences saved")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Reads the preference blob.
///
/// # Returns
///
/// `Ok` with the preference object, `{}` if none saved. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_preferences(state: *mut DesignStoreHandle) -> *const c_char {
    match store_ref(state, "get_preferences") {
        Ok(store) => json_response(&store.get_preferences()),
        Err(err) => err,
    }
}

/// Replaces the catalog cache with a JSON array of catalog entries.
///
/// # Returns
///
/// `Ok` with the cached count, or `ValidationError` if any price, rating or
/// dimension is negative; the previous cache is kept in that case.
/// The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
/// `json_ptr` must be null or point to a NUL-terminated string.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_furniture_catalog(state: *mut DesignStoreHandle, json_ptr: *const c_char) -> *const c_char {
    let store = match store_ref(state, "save_furniture_catalog") {
        Ok(store) => store,
        Err(err) => return err,
    };

    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let entries: Vec<FurnitureCatalogEntry> = match serde_json::from_str(&json_str) {
        Ok(entries) => entries,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid catalog JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    match store.save_catalog(&entries) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!("{} catalog entries cached", entries.len()))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Reads the catalog cache.
///
/// # Returns
///
/// `Ok` with the cached entries, `[]` if none cached. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_furniture_catalog(state: *mut DesignStoreHandle) -> *const c_char {
    match store_ref(state, "get_furniture_catalog") {
        Ok(store) => json_response(&store.get_catalog()),
        Err(err) => err,
    }
}

/// Removes designs, preferences and the catalog cache.
///
/// # Returns
///
/// `Ok`, or `DatabaseError` if the removal failed. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle from [`create_design_store`] that has not
/// been passed to [`close_design_store`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_data(state: *mut DesignStoreHandle) -> *const c_char {
    let store = match store_ref(state, "clear_all_data") {
        Ok(store) => store,
        Err(err) => return err,
    };

    match store.clear_all() {
        Ok(()) => response_to_c_string(&AppResponse::success("All data cleared successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Flushes and closes the store, releasing the handle.
///
/// Call this before a Flutter hot restart so the environment can be
/// reopened cleanly.
///
/// # Returns
///
/// `Ok` once closed, or `DatabaseError` if the final flush failed; the
/// handle is released either way. The returned string must be released with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live handle. It is dangling after this call
/// and must not be closed twice.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_design_store(state: *mut DesignStoreHandle) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to close_design_store".to_string());
        return response_to_c_string(&error);
    }

    let store = unsafe { Box::from_raw(state) };
    let synced = store.substrate().sync();
    drop(store);

    match synced {
        Ok(()) => response_to_c_string(&AppResponse::success("Design store closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Releases a response string returned by any function in this library.
///
/// # Safety
///
/// `ptr` must be null or a string returned by this library that has not
/// been freed yet. Strings from other allocators must not be passed here.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

fn store_ref<'a>(state: *mut DesignStoreHandle, fn_name: &str) -> Result<&'a DesignStoreHandle, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(store) => Ok(store),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn json_response<T: Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Serializes an [`AppResponse`] into a C string owned by the caller.
///
/// Returns null if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string argument, answering `BadRequest` for null or non-UTF-8 input.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
