use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::app_config_dir;
use crate::ui::settings::UiSettings;

const SETTINGS_FILE: &str = "ui_settings.json";

fn settings_path() -> PathBuf {
    app_config_dir().join(SETTINGS_FILE)
}

pub fn load_settings() -> UiSettings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &UiSettings) {
    save_settings_to(&settings_path(), settings);
}

fn load_settings_from(path: &Path) -> UiSettings {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn save_settings_to(path: &Path, settings: &UiSettings) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                warn!(error = %e, path = %path.display(), "could not save UI settings");
            }
        }
        Err(e) => warn!(error = %e, "could not encode UI settings"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = UiSettings {
            ui_scale: 1.5,
            ..Default::default()
        };
        save_settings_to(&path, &settings);

        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{not json").unwrap();

        assert_eq!(load_settings_from(&path), UiSettings::default());
    }
}
