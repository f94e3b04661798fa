//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Size of one map cell in world pixels
pub const GRID_SIZE: f32 = 50.0;

/// Zoom limits for the editor viewport
pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 4.0;

/// Scale multipliers applied per wheel step
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

/// Maximum number of snapshots kept on each of the undo and redo stacks
pub const MAX_HISTORY: usize = 50;

/// Distance from the upper cell boundary at which a dragged object snaps up
/// instead of flooring to the lower boundary.
pub const SNAP_THRESHOLD: f32 = 10.0;

/// Number of rings the free-cell search walks before giving up
pub const MAX_SEARCH_RADIUS: i32 = 10;

/// World-space padding added around the visible window when deriving tiles to draw
pub const RENDER_PADDING: f32 = 200.0;

/// Tile type that removes tiles instead of placing them
pub const ERASER_TILE: &str = "eraser";

/// Character class used for asset lookup when a marker has none
pub const FALLBACK_CHARACTER_CLASS: &str = "fighter";

/// How long an inline status message stays visible, in seconds
pub const STATUS_MESSAGE_SECONDS: i64 = 6;
