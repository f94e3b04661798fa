use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::{egui, EguiContexts};

use crate::constants::ERASER_TILE;
use crate::map::TileType;

use super::state::MapEditor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    SingleTile,
    RectanglePaint,
    ObjectSelect,
}

impl InteractionMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            InteractionMode::SingleTile => "Tile (T)",
            InteractionMode::RectanglePaint => "Rectangle (R)",
            InteractionMode::ObjectSelect => "Select (V)",
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            InteractionMode::SingleTile => CursorIcon::System(SystemCursorIcon::Crosshair),
            InteractionMode::RectanglePaint => CursorIcon::System(SystemCursorIcon::Cell),
            InteractionMode::ObjectSelect => CursorIcon::System(SystemCursorIcon::Default),
        }
    }

    pub fn all() -> &'static [InteractionMode] {
        &[
            InteractionMode::SingleTile,
            InteractionMode::RectanglePaint,
            InteractionMode::ObjectSelect,
        ]
    }

    pub fn from_key(key: KeyCode) -> Option<InteractionMode> {
        match key {
            KeyCode::KeyT => Some(InteractionMode::SingleTile),
            KeyCode::KeyR => Some(InteractionMode::RectanglePaint),
            KeyCode::KeyV | KeyCode::KeyS => Some(InteractionMode::ObjectSelect),
            _ => None,
        }
    }

    /// Whether pointer gestures in this mode paint tiles
    pub fn paints_tiles(&self) -> bool {
        !matches!(self, InteractionMode::ObjectSelect)
    }
}

/// One entry of the tile palette
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePaletteEntry {
    pub key: KeyCode,
    pub digit: char,
    pub tile: &'static str,
    pub color: egui::Color32,
}

impl TilePaletteEntry {
    pub fn tile_type(&self) -> TileType {
        TileType::new(self.tile)
    }

    pub fn label(&self) -> String {
        let mut name = self.tile.to_string();
        if let Some(first) = name.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        format!("{} ({})", name, self.digit)
    }

    pub fn all() -> &'static [TilePaletteEntry] {
        &TILE_PALETTE
    }

    pub fn from_key(key: KeyCode) -> Option<&'static TilePaletteEntry> {
        TILE_PALETTE.iter().find(|entry| entry.key == key)
    }

    pub fn by_tile(tile: &str) -> Option<&'static TilePaletteEntry> {
        TILE_PALETTE.iter().find(|entry| entry.tile == tile)
    }
}

static TILE_PALETTE: [TilePaletteEntry; 8] = [
    TilePaletteEntry {
        key: KeyCode::Digit1,
        digit: '1',
        tile: "grass",
        color: egui::Color32::from_rgb(106, 168, 79),
    },
    TilePaletteEntry {
        key: KeyCode::Digit2,
        digit: '2',
        tile: "water",
        color: egui::Color32::from_rgb(61, 133, 198),
    },
    TilePaletteEntry {
        key: KeyCode::Digit3,
        digit: '3',
        tile: "wall",
        color: egui::Color32::from_rgb(90, 90, 96),
    },
    TilePaletteEntry {
        key: KeyCode::Digit4,
        digit: '4',
        tile: "stone",
        color: egui::Color32::from_rgb(153, 153, 153),
    },
    TilePaletteEntry {
        key: KeyCode::Digit5,
        digit: '5',
        tile: "wood",
        color: egui::Color32::from_rgb(139, 94, 52),
    },
    TilePaletteEntry {
        key: KeyCode::Digit6,
        digit: '6',
        tile: "sand",
        color: egui::Color32::from_rgb(230, 204, 140),
    },
    TilePaletteEntry {
        key: KeyCode::Digit7,
        digit: '7',
        tile: "lava",
        color: egui::Color32::from_rgb(214, 72, 28),
    },
    TilePaletteEntry {
        key: KeyCode::Digit0,
        digit: '0',
        tile: ERASER_TILE,
        color: egui::Color32::from_rgb(40, 40, 40),
    },
];

/// Fill colour for a stored tile type. Unknown types get a neutral grey.
pub fn tile_color(tile: &TileType) -> egui::Color32 {
    TilePaletteEntry::by_tile(tile.as_str())
        .map(|entry| entry.color)
        .unwrap_or(egui::Color32::from_rgb(120, 120, 120))
}

pub fn update_cursor_icon(
    editor: Res<MapEditor>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, mode cursor on the canvas
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    let icon = if editor.viewport.is_panning() {
        CursorIcon::System(SystemCursorIcon::Grabbing)
    } else if editor.is_dragging() {
        CursorIcon::System(SystemCursorIcon::Move)
    } else if editor.mode == InteractionMode::ObjectSelect && editor.hovered.is_some() {
        CursorIcon::System(SystemCursorIcon::Pointer)
    } else {
        editor.mode.cursor_icon()
    };
    commands.entity(entity).insert(icon);
}
