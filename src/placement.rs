//! Room geometry for placed furniture.
//!
//! The room is centred on the origin: x spans the width, z the depth and y
//! points up from the floor.

use crate::design_model::{FurnitureItem, RoomDimensions, Vec3};

/// Clearance kept between an item's origin and the walls, in meters.
pub const WALL_MARGIN: f64 = 0.1;

pub fn distance(a: Vec3, b: Vec3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Whether the item's origin sits inside the floor plan, [`WALL_MARGIN`] from every wall.
pub fn is_valid_placement(item: &FurnitureItem, room: &RoomDimensions) -> bool {
    let half_width = room.width / 2.0 - WALL_MARGIN;
    let half_depth = room.depth / 2.0 - WALL_MARGIN;
    (-half_width..=half_width).contains(&item.position.x)
        && (-half_depth..=half_depth).contains(&item.position.z)
}

/// Floor area in square meters.
pub fn room_area(room: &RoomDimensions) -> f64 {
    room.width * room.depth
}

/// Floor area covered by one item, taking its x/z scale as its size in meters.
pub fn furniture_footprint(item: &FurnitureItem) -> f64 {
    let scale = item.scale.to_vec3();
    scale.x * scale.z
}

/// Share of the floor covered by `items`, as a percentage.
///
/// Overlapping items are counted twice, so the result can exceed 100.
pub fn room_utilization(items: &[FurnitureItem], room: &RoomDimensions) -> f64 {
    let area = room_area(room);
    if area <= 0.0 {
        return 0.0;
    }
    let covered: f64 = items.iter().map(furniture_footprint).sum();
    covered / area * 100.0
}
