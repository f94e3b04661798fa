//! Centralized color theme for the application.
//!
//! This module provides all colors used throughout the editor UI and canvas.
//! Modify values here to change the application's color scheme.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Canvas Colors
// ============================================================================

/// Window clear color behind the canvas
pub const CANVAS_BACKGROUND: Color = Color::srgb(0.12, 0.12, 0.14);

/// Semi-transparent grey grid lines
pub const GRID_COLOR: Color = Color::srgba(0.5, 0.5, 0.5, 0.3);

/// Thicker line through the world origin
pub const GRID_ORIGIN_COLOR: Color = Color::srgba(0.7, 0.7, 0.7, 0.5);

// ============================================================================
// Selection Colors
// ============================================================================

/// Light blue for selected objects
pub const SELECTION_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

/// Faint outline for hovered objects
pub const HOVER_COLOR: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

/// Blue outline for the rectangle paint preview
pub const RECT_PREVIEW_OUTLINE: Color = Color::srgba(0.2, 0.6, 1.0, 0.8);

/// Very light blue fill for the rectangle paint preview
pub const RECT_PREVIEW_FILL: Color = Color::srgba(0.2, 0.6, 1.0, 0.1);

// ============================================================================
// Object Fallback Colors
// ============================================================================

/// Structure fill when its color string cannot be parsed
pub const STRUCTURE_FALLBACK: Color = Color::srgb(0.55, 0.4, 0.25);

/// Character token fill while its image is loading or missing
pub const CHARACTER_FALLBACK: Color = Color::srgb(0.75, 0.3, 0.3);

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tooltips, status bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// White for selected button borders
    pub const SELECTED_BORDER: egui::Color32 = egui::Color32::WHITE;

    /// Dark grey for unselected button borders
    pub const UNSELECTED_BORDER: egui::Color32 = egui::Color32::DARK_GRAY;

    /// Red for error messages
    pub const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(230, 90, 90);

    /// Green for confirmations
    pub const INFO_TEXT: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

    /// Yellow dot for unsaved changes
    pub const UNSAVED_MARKER: egui::Color32 = egui::Color32::from_rgb(230, 200, 80);
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// Convert a Bevy Color to egui Color32 (preserving alpha)
pub fn bevy_to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

/// Parse a `#rrggbb` (or `#rrggbbaa`) color string, falling back when malformed
pub fn parse_hex_or(hex: &str, fallback: Color) -> egui::Color32 {
    egui::Color32::from_hex(hex.trim()).unwrap_or_else(|_| bevy_to_egui(fallback))
}
