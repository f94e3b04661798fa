//! Free-cell search used when adding objects to the map.

use bevy::math::Vec2;

use crate::common::WorldRect;

/// Offsets `0, -1, 1, -2, 2, ...` limited to `[-limit, limit]`.
fn centered_offsets(limit: i32) -> impl Iterator<Item = i32> {
    (0..=limit * 2).map(|i| if i % 2 == 0 { i / 2 } else { -(i + 1) / 2 })
}

/// Cell offsets of one ring around the origin.
///
/// Edges are generated right, left, down, up; each edge is walked from its
/// midpoint outwards so nearer cells come first. Corners belong to the left
/// and right edges.
pub fn ring_offsets(radius: i32) -> Vec<(i32, i32)> {
    if radius <= 0 {
        return vec![(0, 0)];
    }
    let mut cells = Vec::with_capacity((radius * 8) as usize);
    cells.extend(centered_offsets(radius).map(|t| (radius, t)));
    cells.extend(centered_offsets(radius).map(|t| (-radius, t)));
    cells.extend(centered_offsets(radius - 1).map(|t| (t, radius)));
    cells.extend(centered_offsets(radius - 1).map(|t| (t, -radius)));
    cells
}

/// Nearest position to `origin` where a footprint of `size` overlaps none of
/// `occupied`, searching rings up to `max_radius`. Falls back to `origin` when
/// every candidate is taken.
pub fn find_free_cell(
    origin: Vec2,
    size: Vec2,
    grid_size: f32,
    occupied: &[WorldRect],
    max_radius: i32,
) -> Vec2 {
    let is_free = |position: Vec2| {
        let footprint = WorldRect::new(position, size);
        !occupied.iter().any(|rect| rect.overlaps(&footprint))
    };

    if is_free(origin) {
        return origin;
    }

    for radius in 1..=max_radius {
        for (dx, dy) in ring_offsets(radius) {
            let candidate = origin + Vec2::new(dx as f32, dy as f32) * grid_size;
            if is_free(candidate) {
                return candidate;
            }
        }
    }

    origin
}
