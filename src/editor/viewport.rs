//! Pan/zoom transform between screen space and world space.
//!
//! Screen space is window-logical pixels with the origin at the top-left and
//! y growing downwards; world space uses the same orientation, so
//! `screen = world * scale + position`.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::common::WorldRect;
use crate::constants::{MAX_SCALE, MIN_SCALE, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

use super::params::is_cursor_over_ui;
use super::state::MapEditor;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Screen-space pan offset of the world origin
    pub position: Vec2,
    pub scale: f32,
    /// Size of the drawable area in screen pixels
    pub size: Vec2,
    pan_anchor: Option<Vec2>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            size: Vec2::new(
                crate::constants::DEFAULT_WINDOW_WIDTH,
                crate::constants::DEFAULT_WINDOW_HEIGHT,
            ),
            pan_anchor: None,
        }
    }
}

impl Viewport {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.position) / self.scale
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.position
    }

    /// Zoom by one wheel step around a screen point, keeping the world point
    /// under it fixed on screen.
    pub fn zoom(&mut self, delta: f32, pointer: Vec2) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let factor = if delta > 0.0 { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let anchor = self.screen_to_world(pointer);
        self.scale = new_scale;
        self.position = pointer - anchor * new_scale;
    }

    pub fn begin_pan(&mut self, pointer: Vec2) {
        self.pan_anchor = Some(pointer);
    }

    /// Add the screen delta since the previous pan move. Returns false when not panning.
    pub fn pan_to(&mut self, pointer: Vec2) -> bool {
        let Some(last) = self.pan_anchor else {
            return false;
        };
        self.position += pointer - last;
        self.pan_anchor = Some(pointer);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }

    /// World point at the centre of the drawable area.
    pub fn center_world(&self) -> Vec2 {
        self.screen_to_world(self.size / 2.0)
    }

    /// Visible world window expanded by `padding` world pixels on every side.
    pub fn visible_world_rect(&self, padding: f32) -> WorldRect {
        let top_left = self.screen_to_world(Vec2::ZERO) - Vec2::splat(padding);
        WorldRect::new(top_left, self.size / self.scale + Vec2::splat(padding * 2.0))
    }
}

/// Keep the viewport size in sync with the primary window.
pub fn sync_viewport_size(
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut editor: ResMut<MapEditor>,
) {
    let Ok(window) = window_query.single() else {
        return;
    };
    let size = Vec2::new(window.width(), window.height());
    if editor.viewport.size != size {
        editor.viewport.size = size;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut editor: ResMut<MapEditor>,
    mut contexts: EguiContexts,
) {
    if is_cursor_over_ui(&mut contexts) {
        scroll_events.clear();
        return;
    }

    let Some(cursor) = window_query.single().ok().and_then(|w| w.cursor_position()) else {
        scroll_events.clear();
        return;
    };

    for event in scroll_events.read() {
        let amount = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y * 0.01,
        };
        editor.viewport.zoom(amount, cursor);
    }
}
