//! Record schema for everything the design store persists.
//!
//! A [`SavedDesign`] is a named arrangement of [`FurnitureItem`]s inside a
//! room. Designs are stored together as one JSON array; preferences and the
//! furniture catalog cache live under their own keys. Field names on the wire
//! are camelCase and optional fields are omitted when absent, so the stored
//! text stays compatible with what the mobile shell already writes.
//!
//! # Units
//!
//! - Positions, scales and room dimensions are in meters.
//! - Rotations are Euler angles in **radians**, applied in x, y, z order.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Option name to value. The store never looks inside it.
pub type UserPreferences = Map<String, JsonValue>;

/// A point or vector in room space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Scale of a placed item: one factor for every axis, or one per axis.
///
/// Serialized as a bare number for the uniform case and as `{x, y, z}`
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scale {
    Uniform(f64),
    PerAxis(Vec3),
}

impl Scale {
    /// Expands the scale to one factor per axis.
    pub fn to_vec3(self) -> Vec3 {
        match self {
            Scale::Uniform(s) => Vec3::new(s, s, s),
            Scale::PerAxis(v) => v,
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Uniform(1.0)
    }
}

/// One placed piece of furniture inside a design.
///
/// Items are embedded in their design and never persisted on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureItem {
    /// Unique within the owning design only.
    pub id: String,
    pub name: String,
    /// Token naming the 3D asset to render.
    pub model: String,
    pub position: Vec3,
    /// Radians.
    pub rotation: Vec3,
    pub scale: Scale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// One of [`MATERIALS`] in practice; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

/// Material tags the shell offers when styling an item.
pub const MATERIALS: [&str; 6] = ["Wood", "Metal", "Fabric", "Glass", "Plastic", "Leather"];

/// Interior size of the room a design is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 2.7,
            depth: 5.0,
        }
    }
}

/// A named, persisted arrangement of furniture.
///
/// `id` is assigned by the caller before the first save (see
/// [`generate_design_id`]) and never changes afterwards. The order of
/// `furniture` is the render order and is preserved exactly.
///
/// ```rust
/// use ardecor_core::design_model::{generate_design_id, now_iso8601, RoomDimensions, SavedDesign};
///
/// let design = SavedDesign {
///     id: generate_design_id(),
///     name: "Living room".to_string(),
///     date: now_iso8601(),
///     thumbnail: "assets/thumbs/living.png".to_string(),
///     furniture: Vec::new(),
///     room_dimensions: RoomDimensions::default(),
///     description: None,
///     tags: None,
/// };
/// assert!(design.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDesign {
    pub id: String,
    pub name: String,
    /// ISO-8601 creation or last-modification timestamp, kept as given.
    pub date: String,
    /// Opaque URL or local asset path.
    pub thumbnail: String,
    pub furniture: Vec<FurnitureItem>,
    pub room_dimensions: RoomDimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl SavedDesign {
    /// Checks the record invariants the store relies on.
    ///
    /// Rejects an empty id, non-positive or non-finite room dimensions,
    /// non-finite transforms, non-positive scale factors and furniture ids
    /// repeated within this design.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(StoreError::Validation("design id must not be empty".to_string()));
        }

        let room = &self.room_dimensions;
        for (axis, value) in [("width", room.width), ("height", room.height), ("depth", room.depth)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(StoreError::Validation(format!(
                    "design '{}': room {axis} must be a positive number, got {value}",
                    self.id
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.furniture.len());
        for item in &self.furniture {
            if !seen.insert(item.id.as_str()) {
                return Err(StoreError::Validation(format!(
                    "design '{}': duplicate furniture id '{}'",
                    self.id, item.id
                )));
            }
            item.validate().map_err(|e| match e {
                StoreError::Validation(msg) => {
                    StoreError::Validation(format!("design '{}': {msg}", self.id))
                }
                other => other,
            })?;
        }

        Ok(())
    }
}

impl FurnitureItem {
    fn validate(&self) -> Result<()> {
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(StoreError::Validation(format!(
                "furniture '{}' has a non-finite position or rotation",
                self.id
            )));
        }
        let scale = self.scale.to_vec3();
        if !scale.is_finite() || scale.x <= 0.0 || scale.y <= 0.0 || scale.z <= 0.0 {
            return Err(StoreError::Validation(format!(
                "furniture '{}' must have a positive finite scale",
                self.id
            )));
        }
        Ok(())
    }
}

/// Fields to overwrite on an existing design.
///
/// The merge is shallow: every `Some` field replaces the stored field in
/// full (a new `furniture` list replaces the whole list) and every `None`
/// field is left alone. The id cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture: Option<Vec<FurnitureItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_dimensions: Option<RoomDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl DesignPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the patch into `design`.
    pub fn apply_to(self, design: &mut SavedDesign) {
        if let Some(name) = self.name {
            design.name = name;
        }
        if let Some(date) = self.date {
            design.date = date;
        }
        if let Some(thumbnail) = self.thumbnail {
            design.thumbnail = thumbnail;
        }
        if let Some(furniture) = self.furniture {
            design.furniture = furniture;
        }
        if let Some(room) = self.room_dimensions {
            design.room_dimensions = room;
        }
        if let Some(description) = self.description {
            design.description = Some(description);
        }
        if let Some(tags) = self.tags {
            design.tags = Some(tags);
        }
    }
}

/// Physical size of a catalog product, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// Read-mostly product data mirrored from the catalog source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureCatalogEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rating: f64,
    pub image: String,
    pub description: String,
    pub dimensions: CatalogDimensions,
}

impl FurnitureCatalogEntry {
    /// Rejects non-finite or negative numbers, which JSON cannot carry back.
    pub fn validate(&self) -> Result<()> {
        let dims = &self.dimensions;
        let numbers = [
            ("price", self.price),
            ("rating", self.rating),
            ("width", dims.width),
            ("height", dims.height),
            ("depth", dims.depth),
        ];
        for (field, value) in numbers {
            if !(value.is_finite() && value >= 0.0) {
                return Err(StoreError::Validation(format!(
                    "catalog entry '{}': {field} must be a non-negative number, got {value}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Product categories the catalog is grouped by.
pub const CATEGORIES: [&str; 6] = ["Sofas", "Tables", "Chairs", "Storage", "Lighting", "Decor"];

/// Generates an identifier for a new design: `design_<millis>_<random>`.
///
/// Distinct enough for interactive use; not a cryptographic identifier.
pub fn generate_design_id() -> String {
    timestamped_id("design")
}

/// Generates an identifier for a newly placed item: `furniture_<millis>_<random>`.
pub fn generate_furniture_id() -> String {
    timestamped_id("furniture")
}

/// Current UTC time as ISO-8601 with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn timestamped_id(prefix: &str) -> String {
    format!("{prefix}_{}_{}", Utc::now().timestamp_millis(), random_base36(9))
}

fn random_base36(len: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut bits = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(len);
    for _ in 0..len {
        out.push(DIGITS[(bits % 36) as usize] as char);
        bits /= 36;
    }
    out
}
