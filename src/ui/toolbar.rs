use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{AppConfig, SaveConfigRequest};
use crate::editor::{InteractionMode, MapEditor};
use crate::map::{CurrentMap, PersistenceStatus, StatusKind};
use crate::theme::ui as colors;

/// Main toolbar: interaction modes, history, grid and status
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut editor: ResMut<MapEditor>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
    status: Res<PersistenceStatus>,
    current_map: Res<CurrentMap>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for mode in InteractionMode::all() {
                    let button = egui::Button::new(
                        egui::RichText::new(mode.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(editor.mode() == *mode);

                    if ui.add(button).clicked() {
                        editor.set_mode(*mode);
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let undo = ui
                    .add_enabled(editor.can_undo(), egui::Button::new("Undo"))
                    .on_hover_text(format!("Ctrl+Z ({} steps)", editor.history().undo_count()));
                if undo.clicked() {
                    editor.undo();
                }
                let redo = ui
                    .add_enabled(editor.can_redo(), egui::Button::new("Redo"))
                    .on_hover_text(format!(
                        "Ctrl+Y / Ctrl+Shift+Z ({} steps)",
                        editor.history().redo_count()
                    ));
                if redo.clicked() {
                    editor.redo();
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                let mut show_grid = editor.show_grid;
                if ui.checkbox(&mut show_grid, "Grid").changed() {
                    editor.show_grid = show_grid;
                    config.data.show_grid = show_grid;
                    config.dirty = true;
                    save_events.write(SaveConfigRequest);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let title = current_map.name.as_deref().unwrap_or("Untitled map");
                    ui.label(egui::RichText::new(title).color(colors::LABEL_TEXT));
                    if editor.has_unsaved_changes() {
                        ui.colored_label(colors::UNSAVED_MARKER, "●")
                            .on_hover_text("Unsaved changes");
                    }

                    if let Some(message) = &status.message {
                        ui.add_space(12.0);
                        let color = match message.kind {
                            StatusKind::Info => colors::INFO_TEXT,
                            StatusKind::Error => colors::ERROR_TEXT,
                        };
                        ui.colored_label(color, &message.text);
                    } else if status.is_busy() {
                        ui.add_space(12.0);
                        ui.spinner();
                    }
                });
            });
        });
    Ok(())
}
