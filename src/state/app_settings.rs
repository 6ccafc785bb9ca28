use anyhow::Context;
use log::LevelFilter;
use scorebook_api::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Preferences persisted between runs in `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Explicit locale preference; wins over every other locale signal.
    pub locale: Option<String>,
    /// Explicit IANA timezone preference.
    pub timezone: Option<String>,
    pub default_sport: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub full_screen: bool,
}

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub user: UserSettings,
    pub api_url: String,
    pub log_level: Option<LevelFilter>,
    pub path: PathBuf,
}

impl AppSettings {
    /// Read `SCOREBOOK_*` environment overrides and the settings file.
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let path = settings_path();
        let user = match load_user_settings(&path) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("using default settings: {e:#}");
                UserSettings::default()
            }
        };
        Self {
            user,
            api_url: env_value("SCOREBOOK_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_level: env_value("SCOREBOOK_LOG").and_then(|l| LevelFilter::from_str(&l).ok()),
            path,
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        save_user_settings(&self.path, &self.user)
    }

    /// Re-read the file after an external change. Returns true when anything differs.
    pub fn reload(&mut self) -> anyhow::Result<bool> {
        let fresh = load_user_settings(&self.path)?;
        if fresh == self.user {
            return Ok(false);
        }
        self.user = fresh;
        Ok(true)
    }
}

pub fn load_user_settings(path: &Path) -> anyhow::Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read settings failed: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(UserSettings::default());
    }
    serde_json::from_str(&content)
        .with_context(|| format!("parse settings failed: {}", path.display()))
}

pub fn save_user_settings(path: &Path, user: &UserSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir failed: {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(user).context("serialize settings failed")?;
    std::fs::write(path, payload)
        .with_context(|| format!("write settings failed: {}", path.display()))
}

pub fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn settings_path() -> PathBuf {
    if let Some(config_dir) = env_value("XDG_CONFIG_HOME") {
        return PathBuf::from(config_dir).join("scorebook").join("settings.json");
    }
    if let Some(home) = env_value("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("scorebook")
            .join("settings.json");
    }
    PathBuf::from("scorebook-settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("scorebook-test-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = scratch_path("missing");
        assert_eq!(load_user_settings(&path).unwrap(), UserSettings::default());
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let path = scratch_path("roundtrip");
        let user = UserSettings {
            locale: Some("en-AU".into()),
            timezone: Some("Australia/Perth".into()),
            token: Some("tok".into()),
            ..Default::default()
        };
        save_user_settings(&path, &user).unwrap();
        assert_eq!(load_user_settings(&path).unwrap(), user);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let path = scratch_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"locale":"fr-FR","theme":"dark"}"#).unwrap();
        let user = load_user_settings(&path).unwrap();
        assert_eq!(user.locale.as_deref(), Some("fr-FR"));
        assert!(user.timezone.is_none());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn reload_reports_external_changes() {
        let path = scratch_path("reload");
        let mut settings = AppSettings {
            user: UserSettings::default(),
            api_url: DEFAULT_BASE_URL.into(),
            log_level: None,
            path: path.clone(),
        };
        settings.save().unwrap();
        assert!(!settings.reload().unwrap());

        let changed = UserSettings {
            timezone: Some("Europe/Madrid".into()),
            ..Default::default()
        };
        save_user_settings(&path, &changed).unwrap();
        assert!(settings.reload().unwrap());
        assert_eq!(settings.user.timezone.as_deref(), Some("Europe/Madrid"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
