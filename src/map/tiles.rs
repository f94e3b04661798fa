//! Sparse tile storage keyed by grid cell.

use bevy::math::Vec2;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::common::WorldRect;
use crate::constants::ERASER_TILE;

/// Quantize a coordinate down to the nearest lower multiple of the grid unit.
pub fn snap_floor(value: f32, grid_size: f32) -> f32 {
    (value / grid_size).floor() * grid_size
}

/// Top-left corner of a grid cell, in world pixels. Both components are
/// multiples of the grid unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKey {
    pub x: i64,
    pub y: i64,
}

impl TileKey {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Key of the cell containing a world position.
    pub fn from_world(position: Vec2, grid_size: f32) -> Self {
        Self {
            x: snap_floor(position.x, grid_size) as i64,
            y: snap_floor(position.y, grid_size) as i64,
        }
    }

    pub fn to_world(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn is_aligned(self, grid_size: f32) -> bool {
        let g = grid_size as i64;
        g > 0 && self.x % g == 0 && self.y % g == 0
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileKeyError {
    #[error("tile key {0:?} is not of the form \"x,y\"")]
    Malformed(String),
    #[error("tile key {0:?} has a non-numeric coordinate")]
    NotNumeric(String),
}

impl FromStr for TileKey {
    type Err = TileKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| TileKeyError::Malformed(s.to_string()))?;
        let parse = |part: &str| -> Result<i64, TileKeyError> {
            let value: f64 = part
                .trim()
                .parse()
                .map_err(|_| TileKeyError::NotNumeric(s.to_string()))?;
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(TileKeyError::NotNumeric(s.to_string()));
            }
            Ok(value as i64)
        };
        Ok(Self { x: parse(x)?, y: parse(y)? })
    }
}

/// Tile label such as "grass" or "wall".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileType(String);

impl TileType {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn eraser() -> Self {
        Self(ERASER_TILE.to_string())
    }

    pub fn is_eraser(&self) -> bool {
        self.0 == ERASER_TILE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grid-quantized mapping from cell to tile type.
///
/// The grid is unbounded; nothing here validates against world bounds.
/// `revision` increases on every change and is used to key render caches.
#[derive(Debug, Clone, Default)]
pub struct TileStore {
    tiles: BTreeMap<TileKey, TileType>,
    revision: u64,
}

impl PartialEq for TileStore {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
    }
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, key: TileKey) -> Option<&TileType> {
        self.tiles.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TileKey, &TileType)> {
        self.tiles.iter()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Mark the store as changed without mutating it (used when a snapshot
    /// replaces live state so caches recompute).
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Apply the place/erase rule to one cell key. Returns true when the store changed.
    pub fn apply(&mut self, key: TileKey, tile: &TileType) -> bool {
        let changed = if tile.is_eraser() {
            self.tiles.remove(&key).is_some()
        } else {
            self.tiles.insert(key, tile.clone()).as_ref() != Some(tile)
        };
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Place (or erase) the tile at the cell containing a world position.
    pub fn place(&mut self, position: Vec2, grid_size: f32, tile: &TileType) -> bool {
        self.apply(TileKey::from_world(position, grid_size), tile)
    }

    /// Apply the tile to every cell whose top-left lies inside `[min, max)` of the rect.
    /// Returns the number of cells that changed.
    pub fn paint_rect(&mut self, rect: WorldRect, grid_size: f32, tile: &TileType) -> usize {
        if !rect.is_finite() || grid_size <= 0.0 {
            return 0;
        }
        let min = rect.min();
        let max = rect.max();
        let start_x = (min.x / grid_size).ceil() as i64;
        let start_y = (min.y / grid_size).ceil() as i64;
        let g = grid_size as i64;

        let mut changed = 0;
        let mut cx = start_x;
        while (cx as f32) * grid_size < max.x {
            let mut cy = start_y;
            while (cy as f32) * grid_size < max.y {
                if self.apply(TileKey::new(cx * g, cy * g), tile) {
                    changed += 1;
                }
                cy += 1;
            }
            cx += 1;
        }
        changed
    }

    /// Tiles whose cell top-left lies inside the given window.
    pub fn in_rect(&self, rect: WorldRect) -> impl Iterator<Item = (&TileKey, &TileType)> {
        self.tiles
            .iter()
            .filter(move |(key, _)| rect.contains(key.to_world()))
    }

    /// Insert a tile directly, bypassing the eraser rule. Used when rebuilding from storage.
    pub(crate) fn insert_raw(&mut self, key: TileKey, tile: TileType) {
        self.tiles.insert(key, tile);
        self.revision += 1;
    }
}
