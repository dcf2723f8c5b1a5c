use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::locale::Locale;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub vibration_enabled: bool,
    pub chime_enabled: bool,
    pub locale: Locale,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            vibration_enabled: true,
            chime_enabled: true,
            locale: Locale::default(),
        }
    }
}

/// JSON-backed preferences. Every update is written through immediately.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// A missing or unreadable file falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring corrupt settings at {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn snapshot(&self) -> Result<UserSettings> {
        Ok(self.read()?.clone())
    }

    pub fn vibration_enabled(&self) -> Result<bool> {
        Ok(self.read()?.vibration_enabled)
    }

    pub fn chime_enabled(&self) -> Result<bool> {
        Ok(self.read()?.chime_enabled)
    }

    pub fn locale(&self) -> Result<Locale> {
        Ok(self.read()?.locale)
    }

    pub fn update_vibration(&self, enabled: bool) -> Result<()> {
        self.update(|data| data.vibration_enabled = enabled)
    }

    pub fn update_chime(&self, enabled: bool) -> Result<()> {
        self.update(|data| data.chime_enabled = enabled)
    }

    pub fn update_locale(&self, locale: Locale) -> Result<()> {
        self.update(|data| data.locale = locale)
    }

    fn update(&self, apply: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self.write()?;
        apply(&mut guard);
        self.persist(&guard)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UserSettings>> {
        self.data
            .read()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UserSettings>> {
        self.data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
