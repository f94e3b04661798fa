use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::identity::{Identity, SharedIdentity};

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Application configuration persisted to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Signed-in local profile; maps and roster entries are scoped to its id
    #[serde(default)]
    pub profile: Option<Identity>,

    /// Name of the last saved or loaded map (prefills the save-as field)
    #[serde(default)]
    pub last_map_name: Option<String>,

    #[serde(default = "default_show_grid")]
    pub show_grid: bool,
}

fn default_show_grid() -> bool {
    true
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            profile: None,
            last_map_name: None,
            show_grid: default_show_grid(),
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to sign in as (or out of) a local profile
#[derive(Message)]
pub struct SetProfileRequest {
    pub profile: Option<Identity>,
}

/// Message to remember the map name last saved or loaded
#[derive(Message)]
pub struct UpdateLastMapNameRequest {
    pub name: String,
}

/// Read and parse a config file. Returns defaults plus a reason when the file
/// exists but cannot be used.
fn read_config_file(config_path: &std::path::Path) -> (AppConfigData, Option<String>) {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return (AppConfigData::default(), None);
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(data) => {
                info!("Loaded config from {:?}", config_path);
                (data, None)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Configuration file was corrupted: {}", e)),
                )
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            (
                AppConfigData::default(),
                Some(format!("Could not read configuration file: {}", e)),
            )
        }
    }
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
    identity: Res<SharedIdentity>,
) {
    let (data, reset_reason) = read_config_file(&config.config_path);
    config.data = data;
    config.dirty = false;
    identity.set(config.data.profile.clone());

    // Set notification if config was reset due to an error
    if let Some(reason) = reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

/// System to switch the signed-in profile
fn set_profile_system(
    mut events: MessageReader<SetProfileRequest>,
    mut config: ResMut<AppConfig>,
    identity: Res<SharedIdentity>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        match &event.profile {
            Some(profile) => info!("Signed in as {} ({})", profile.display_name, profile.id),
            None => info!("Signed out"),
        }
        identity.set(event.profile.clone());
        config.data.profile = event.profile.clone();
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

/// System to update the last map name
fn update_last_map_name_system(
    mut events: MessageReader<UpdateLastMapNameRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.last_map_name.as_deref() == Some(event.name.as_str()) {
            continue;
        }
        config.data.last_map_name = Some(event.name.clone());
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .init_resource::<SharedIdentity>()
            .add_message::<SaveConfigRequest>()
            .add_message::<SetProfileRequest>()
            .add_message::<UpdateLastMapNameRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    set_profile_system.run_if(on_message::<SetProfileRequest>),
                    update_last_map_name_system.run_if(on_message::<UpdateLastMapNameRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_app_config_data_default() {
        let data = AppConfigData::default();
        assert!(data.profile.is_none());
        assert!(data.last_map_name.is_none());
        assert!(data.show_grid);
    }

    #[test]
    fn test_app_config_data_serialization() {
        let data = AppConfigData {
            profile: Some(Identity::new("u1", "Ada")),
            last_map_name: Some("Tavern".to_string()),
            show_grid: false,
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: AppConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.profile, data.profile);
        assert_eq!(parsed.last_map_name, data.last_map_name);
        assert!(!parsed.show_grid);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed: AppConfigData = serde_json::from_str("{}").unwrap();
        assert!(parsed.profile.is_none());
        assert!(parsed.show_grid);
    }

    #[test]
    fn test_corrupt_config_resets_with_reason() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ definitely not json").unwrap();

        let (data, reason) = read_config_file(file.path());
        assert!(data.profile.is_none());
        assert!(reason.unwrap().contains("corrupted"));
    }

    #[test]
    fn test_missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (_, reason) = read_config_file(&dir.path().join("config.json"));
        assert!(reason.is_none());
    }
}
