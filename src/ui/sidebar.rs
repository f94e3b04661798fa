use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::editor::tools::tile_color;
use crate::editor::{InteractionMode, MapEditor, TilePaletteEntry};
use crate::map::{ObjectRef, StructureTemplate};
use crate::roster::{RefreshRosterRequest, RosterState};
use crate::theme::ui as colors;

const SWATCH_SIZE: f32 = 18.0;

fn section_heading(ui: &mut egui::Ui, title: &str) {
    ui.add_space(4.0);
    ui.label(egui::RichText::new(title).heading().size(16.0));
    ui.add_space(2.0);
    ui.separator();
    ui.add_space(4.0);
}

/// Left panel: tile palette, structures, roster characters and the current selection
pub fn sidebar_ui(
    mut contexts: EguiContexts,
    mut editor: ResMut<MapEditor>,
    roster: Res<RosterState>,
    mut refresh_events: MessageWriter<RefreshRosterRequest>,
) -> Result {
    egui::SidePanel::left("editor_sidebar")
        .default_width(210.0)
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                tile_palette(ui, &mut editor);
                structure_list(ui, &mut editor);
                roster_list(ui, &mut editor, &roster, &mut refresh_events);
                selection_details(ui, &mut editor);
            });
        });
    Ok(())
}

fn tile_palette(ui: &mut egui::Ui, editor: &mut MapEditor) {
    section_heading(ui, "Tiles");

    for entry in TilePaletteEntry::all() {
        let tile = entry.tile_type();
        let active = *editor.active_tile() == tile;

        ui.horizontal(|ui| {
            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::hover());
            let border = if active {
                colors::SELECTED_BORDER
            } else {
                colors::UNSELECTED_BORDER
            };
            if tile.is_eraser() {
                ui.painter().rect_stroke(
                    rect,
                    2.0,
                    egui::Stroke::new(1.0, border),
                    egui::StrokeKind::Inside,
                );
                ui.painter()
                    .line_segment([rect.left_top(), rect.right_bottom()], (1.5, colors::ERROR_TEXT));
            } else {
                ui.painter().rect_filled(rect, 2.0, tile_color(&tile));
                ui.painter().rect_stroke(
                    rect,
                    2.0,
                    egui::Stroke::new(1.0, border),
                    egui::StrokeKind::Inside,
                );
            }

            if ui.selectable_label(active, entry.label()).clicked() {
                editor.set_active_tile(tile.clone());
                if !editor.mode().paints_tiles() {
                    editor.set_mode(InteractionMode::SingleTile);
                }
            }
        });
    }
}

fn structure_list(ui: &mut egui::Ui, editor: &mut MapEditor) {
    ui.add_space(8.0);
    section_heading(ui, "Structures");

    egui::Grid::new("structure_templates")
        .num_columns(2)
        .spacing([6.0, 4.0])
        .show(ui, |ui| {
            for (index, template) in StructureTemplate::all().iter().enumerate() {
                let (w, h) = template.cells;
                if ui
                    .button(template.name)
                    .on_hover_text(format!("{}x{} cells", w, h))
                    .clicked()
                {
                    let added = editor.add_structure(template);
                    editor.set_mode(InteractionMode::ObjectSelect);
                    editor.select(added);
                }
                if index % 2 == 1 {
                    ui.end_row();
                }
            }
        });
}

fn roster_list(
    ui: &mut egui::Ui,
    editor: &mut MapEditor,
    roster: &RosterState,
    refresh_events: &mut MessageWriter<RefreshRosterRequest>,
) {
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Characters").heading().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if roster.loading {
                ui.spinner();
            } else if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                refresh_events.write(RefreshRosterRequest);
            }
        });
    });
    ui.separator();
    ui.add_space(4.0);

    if let Some(error) = &roster.error {
        ui.colored_label(colors::ERROR_TEXT, error);
    }
    if roster.characters.is_empty() {
        ui.label(
            egui::RichText::new("No characters available")
                .color(colors::HINT_TEXT)
                .italics(),
        );
        return;
    }

    for character in &roster.characters {
        let placed = editor.has_character(&character.id);
        ui.horizontal(|ui| {
            ui.label(&character.name);
            if !character.class.is_empty() {
                ui.label(
                    egui::RichText::new(format!("{} {}", character.class, character.level))
                        .color(colors::HINT_TEXT)
                        .size(11.0),
                );
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if placed { "Placed" } else { "Add" };
                if ui.add_enabled(!placed, egui::Button::new(label)).clicked()
                    && let Some(added) = editor.add_character(character)
                {
                    editor.set_mode(InteractionMode::ObjectSelect);
                    editor.select(added);
                }
            });
        });
    }
}

fn selection_details(ui: &mut egui::Ui, editor: &mut MapEditor) {
    let selected = editor.selected();
    let Some(target) = selected.first().copied() else {
        return;
    };

    ui.add_space(8.0);
    section_heading(ui, "Selection");

    let map = editor.map();
    let details = match target {
        ObjectRef::Structure(id) => map
            .structures
            .iter()
            .find(|s| s.id == id)
            .map(|s| (s.name.clone(), s.position, s.size)),
        ObjectRef::Character(id) => map
            .characters
            .iter()
            .find(|c| c.id == id)
            .map(|c| (format!("{} ({})", c.name, c.class), c.position, c.size)),
    };

    if let Some((name, position, size)) = details {
        ui.label(egui::RichText::new(name).strong());
        ui.label(
            egui::RichText::new(format!(
                "at ({:.0}, {:.0}), {:.0}x{:.0}",
                position.x, position.y, size.x, size.y
            ))
            .color(colors::HINT_TEXT),
        );
    }

    ui.add_space(4.0);
    if ui.button("Delete").on_hover_text("Delete / Backspace").clicked() {
        editor.remove_selected();
    }
}
