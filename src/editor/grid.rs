use bevy::prelude::*;

use crate::common::WorldRect;
use crate::map::{TileKey, TileStore, TileType};

use super::viewport::Viewport;

pub use crate::map::snap_floor;

/// Snap to the nearest grid multiple.
pub fn snap_round(value: f32, grid_size: f32) -> f32 {
    (value / grid_size).round() * grid_size
}

/// Drag snapping with a floor bias.
///
/// Coordinates within `grid_size - threshold` of the lower cell boundary floor
/// down; only the last `threshold` pixels before the next boundary round up.
pub fn snap_with_threshold(value: f32, grid_size: f32, threshold: f32) -> f32 {
    let lower = snap_floor(value, grid_size);
    if value - lower < grid_size - threshold {
        lower
    } else {
        snap_round(value, grid_size)
    }
}

pub fn snap_vec_round(position: Vec2, grid_size: f32) -> Vec2 {
    Vec2::new(snap_round(position.x, grid_size), snap_round(position.y, grid_size))
}

pub fn snap_vec_floor(position: Vec2, grid_size: f32) -> Vec2 {
    Vec2::new(snap_floor(position.x, grid_size), snap_floor(position.y, grid_size))
}

pub fn snap_vec_threshold(position: Vec2, grid_size: f32, threshold: f32) -> Vec2 {
    Vec2::new(
        snap_with_threshold(position.x, grid_size, threshold),
        snap_with_threshold(position.y, grid_size, threshold),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderKey {
    position: Vec2,
    scale: f32,
    size: Vec2,
    tiles_revision: u64,
}

/// Memoized view of the tiles near the viewport.
///
/// Recomputed only when the viewport position, scale, size or the tile store
/// revision changes.
#[derive(Debug, Default)]
pub struct TileRenderCache {
    key: Option<RenderKey>,
    window: WorldRect,
    tiles: Vec<(TileKey, TileType)>,
    recomputations: u64,
}

impl TileRenderCache {
    pub fn refresh(&mut self, viewport: &Viewport, tiles: &TileStore, padding: f32) {
        let key = RenderKey {
            position: viewport.position,
            scale: viewport.scale,
            size: viewport.size,
            tiles_revision: tiles.revision(),
        };
        if self.key == Some(key) {
            return;
        }

        self.window = viewport.visible_world_rect(padding);
        self.tiles = if self.window.is_finite() {
            tiles
                .in_rect(self.window)
                .map(|(k, t)| (*k, t.clone()))
                .collect()
        } else {
            Vec::new()
        };
        self.key = Some(key);
        self.recomputations += 1;
    }

    pub fn tiles(&self) -> &[(TileKey, TileType)] {
        &self.tiles
    }

    pub fn window(&self) -> WorldRect {
        self.window
    }

    /// World x/y coordinates of the grid lines covering the cached window.
    pub fn grid_lines(&self, grid_size: f32) -> (Vec<f32>, Vec<f32>) {
        if !self.window.is_finite() || grid_size <= 0.0 {
            return (Vec::new(), Vec::new());
        }
        let min = self.window.min();
        let max = self.window.max();
        let lines = |from: f32, to: f32| -> Vec<f32> {
            let start = (from / grid_size).floor() as i64;
            let end = (to / grid_size).ceil() as i64;
            (start..=end).map(|i| i as f32 * grid_size).collect()
        };
        (lines(min.x, max.x), lines(min.y, max.y))
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }

    #[cfg(test)]
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f32 = 50.0;

    #[test]
    fn test_snap_round() {
        assert_eq!(snap_round(24.0, G), 0.0);
        assert_eq!(snap_round(26.0, G), 50.0);
        assert_eq!(snap_round(-26.0, G), -50.0);
    }

    #[test]
    fn test_threshold_snap_floors_inside_deadzone() {
        // Anything short of the last 10 pixels stays on the lower boundary
        assert_eq!(snap_with_threshold(100.0, G, 10.0), 100.0);
        assert_eq!(snap_with_threshold(126.0, G, 10.0), 100.0);
        assert_eq!(snap_with_threshold(139.9, G, 10.0), 100.0);
    }

    #[test]
    fn test_threshold_snap_rounds_near_upper_boundary() {
        assert_eq!(snap_with_threshold(140.0, G, 10.0), 150.0);
        assert_eq!(snap_with_threshold(149.0, G, 10.0), 150.0);
    }

    #[test]
    fn test_threshold_snap_differs_from_round() {
        // Plain rounding would move to 150; the biased snap keeps 100
        assert_eq!(snap_round(130.0, G), 150.0);
        assert_eq!(snap_with_threshold(130.0, G, 10.0), 100.0);
    }

    #[test]
    fn test_threshold_snap_negative() {
        assert_eq!(snap_with_threshold(-30.0, G, 10.0), -50.0);
        assert_eq!(snap_with_threshold(-5.0, G, 10.0), 0.0);
    }

    #[test]
    fn test_render_cache_memoizes() {
        let mut cache = TileRenderCache::default();
        let viewport = Viewport::default();
        let mut tiles = TileStore::new();
        tiles.place(Vec2::new(10.0, 10.0), G, &TileType::new("grass"));

        cache.refresh(&viewport, &tiles, 100.0);
        cache.refresh(&viewport, &tiles, 100.0);
        assert_eq!(cache.recomputations(), 1);
        assert_eq!(cache.tiles().len(), 1);

        tiles.place(Vec2::new(60.0, 10.0), G, &TileType::new("water"));
        cache.refresh(&viewport, &tiles, 100.0);
        assert_eq!(cache.recomputations(), 2);
        assert_eq!(cache.tiles().len(), 2);
    }

    #[test]
    fn test_render_cache_recomputes_on_pan_and_zoom() {
        let mut cache = TileRenderCache::default();
        let mut viewport = Viewport::default();
        let tiles = TileStore::new();

        cache.refresh(&viewport, &tiles, 0.0);
        viewport.position.x += 10.0;
        cache.refresh(&viewport, &tiles, 0.0);
        viewport.zoom(1.0, Vec2::ZERO);
        cache.refresh(&viewport, &tiles, 0.0);
        assert_eq!(cache.recomputations(), 3);
    }

    #[test]
    fn test_render_cache_excludes_far_tiles() {
        let mut cache = TileRenderCache::default();
        let viewport = Viewport::default();
        let mut tiles = TileStore::new();
        tiles.place(Vec2::new(100_000.0, 0.0), G, &TileType::new("lava"));
        cache.refresh(&viewport, &tiles, 100.0);
        assert!(cache.tiles().is_empty());
    }

    #[test]
    fn test_grid_lines_cover_window() {
        let mut cache = TileRenderCache::default();
        let mut viewport = Viewport::default();
        viewport.size = Vec2::new(100.0, 50.0);
        cache.refresh(&viewport, &TileStore::new(), 0.0);
        let (xs, ys) = cache.grid_lines(G);
        assert_eq!(xs, vec![0.0, 50.0, 100.0]);
        assert_eq!(ys, vec![0.0, 50.0]);
    }
}
