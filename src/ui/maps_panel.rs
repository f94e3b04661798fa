use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::{AppConfig, SetProfileRequest};
use crate::editor::MapEditor;
use crate::identity::{Identity, IdentityProvider, SharedIdentity};
use crate::map::{
    CurrentMap, DeleteMapRequest, ListMapsRequest, LoadMapRequest, NewMapRequest,
    PersistenceStatus, SaveMapRequest, SavedMapList,
};
use crate::roster::RefreshRosterRequest;
use crate::theme::ui as colors;

/// Text fields and pending confirmations of the maps panel
#[derive(Resource, Default)]
pub struct MapsPanelState {
    pub profile_name: String,
    pub save_name: String,
    /// Whether `save_name` has been prefilled from the config
    pub prefilled: bool,
    pub confirm_new: bool,
    pub confirm_load: Option<String>,
    pub confirm_delete: Option<(String, String)>,
}

/// Requests the panel can send in one frame
#[derive(bevy::ecs::system::SystemParam)]
pub struct MapsPanelRequests<'w> {
    save: MessageWriter<'w, SaveMapRequest>,
    load: MessageWriter<'w, LoadMapRequest>,
    list: MessageWriter<'w, ListMapsRequest>,
    delete: MessageWriter<'w, DeleteMapRequest>,
    new_map: MessageWriter<'w, NewMapRequest>,
    profile: MessageWriter<'w, SetProfileRequest>,
    roster: MessageWriter<'w, RefreshRosterRequest>,
}

impl MapsPanelRequests<'_> {
    fn switch_profile(&mut self, identity: &SharedIdentity, profile: Option<Identity>) {
        // Update the shared slot now so the follow-up listings see the new user
        identity.set(profile.clone());
        self.profile.write(SetProfileRequest { profile });
        self.list.write(ListMapsRequest);
        self.roster.write(RefreshRosterRequest);
    }
}

/// Right panel: profile, save-as and the saved map list
#[allow(clippy::too_many_arguments)]
pub fn maps_panel_ui(
    mut contexts: EguiContexts,
    mut panel: ResMut<MapsPanelState>,
    mut requests: MapsPanelRequests,
    identity: Res<SharedIdentity>,
    config: Res<AppConfig>,
    editor: Res<MapEditor>,
    status: Res<PersistenceStatus>,
    saved: Res<SavedMapList>,
    current_map: Res<CurrentMap>,
) -> Result {
    if !panel.prefilled {
        panel.save_name = config.data.last_map_name.clone().unwrap_or_default();
        panel.prefilled = true;
    }
    let user = identity.current_user();

    egui::SidePanel::right("maps_panel")
        .default_width(230.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Profile").heading().size(16.0));
            ui.separator();

            match &user {
                Some(user) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&user.display_name).strong());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Sign out").clicked() {
                                requests.switch_profile(&identity, None);
                            }
                        });
                    });
                }
                None => {
                    ui.label(
                        egui::RichText::new("Sign in to save and load maps")
                            .color(colors::HINT_TEXT),
                    );
                    ui.horizontal(|ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut panel.profile_name)
                                .hint_text("Name")
                                .desired_width(140.0),
                        );
                        let name = panel.profile_name.trim().to_string();
                        if ui
                            .add_enabled(!name.is_empty(), egui::Button::new("Sign in"))
                            .clicked()
                        {
                            requests.switch_profile(&identity, Some(Identity::local(&name)));
                            panel.profile_name.clear();
                        }
                    });
                }
            }

            ui.add_space(12.0);
            ui.label(egui::RichText::new("Map").heading().size(16.0));
            ui.separator();

            ui.horizontal(|ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut panel.save_name)
                        .hint_text("Map name")
                        .desired_width(140.0),
                );
                let can_save = !status.is_saving && !panel.save_name.trim().is_empty();
                if ui.add_enabled(can_save, egui::Button::new("Save")).clicked() {
                    requests.save.write(SaveMapRequest {
                        name: panel.save_name.trim().to_string(),
                    });
                }
            });
            if ui.button("New map").clicked() {
                if editor.has_unsaved_changes() {
                    panel.confirm_new = true;
                } else {
                    requests.new_map.write(NewMapRequest);
                }
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Saved maps").heading().size(16.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if status.is_listing {
                        ui.spinner();
                    } else if user.is_some()
                        && ui.small_button("⟳").on_hover_text("Refresh").clicked()
                    {
                        requests.list.write(ListMapsRequest);
                    }
                });
            });
            ui.separator();

            if user.is_none() {
                return;
            }
            if saved.maps.is_empty() {
                let text = if saved.loaded { "No saved maps" } else { "Loading..." };
                ui.label(egui::RichText::new(text).color(colors::HINT_TEXT).italics());
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                for map in &saved.maps {
                    let is_current = current_map.id.as_deref() == Some(map.id.as_str());
                    ui.horizontal(|ui| {
                        let label = ui.selectable_label(is_current, &map.name).on_hover_text(
                            format!("Updated {}", map.updated_at.format("%Y-%m-%d %H:%M")),
                        );
                        if label.clicked() {
                            if editor.has_unsaved_changes() {
                                panel.confirm_load = Some(map.id.clone());
                            } else {
                                requests.load.write(LoadMapRequest { id: map.id.clone() });
                            }
                        }
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Delete").clicked() {
                                panel.confirm_delete = Some((map.id.clone(), map.name.clone()));
                            }
                        });
                    });
                }
            });
        });

    confirmation_dialogs(contexts.ctx_mut()?, &mut panel, &mut requests);
    Ok(())
}

fn confirmation_dialogs(
    ctx: &egui::Context,
    panel: &mut MapsPanelState,
    requests: &mut MapsPanelRequests,
) {
    if panel.confirm_new || panel.confirm_load.is_some() {
        let mut proceed = false;
        let mut cancel = false;
        egui::Window::new("Unsaved Changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("The current map has unsaved changes that will be lost.");
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    proceed = ui.button("Discard changes").clicked();
                    cancel = ui.button("Cancel").clicked();
                });
            });
        if proceed {
            if let Some(id) = panel.confirm_load.take() {
                requests.load.write(LoadMapRequest { id });
            } else {
                requests.new_map.write(NewMapRequest);
            }
            panel.confirm_new = false;
        } else if cancel {
            panel.confirm_new = false;
            panel.confirm_load = None;
        }
    }

    if let Some((id, name)) = panel.confirm_delete.clone() {
        egui::Window::new("Delete Map")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Delete \"{}\"? This cannot be undone.", name));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        requests.delete.write(DeleteMapRequest { id });
                        panel.confirm_delete = None;
                    }
                    if ui.button("Cancel").clicked() {
                        panel.confirm_delete = None;
                    }
                });
            });
    }
}
