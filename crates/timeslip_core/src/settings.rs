//! Presentation settings persisted in their own slot.
//!
//! These settings only shape how anomalies are rendered; they never touch
//! journal entries. The stored shape is `{"state": {...}, "version": 0}`.

use crate::storage::KeyValueStore;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Slot key holding UI settings.
pub const UI_SETTINGS_STORAGE_KEY: &str = "ui-settings-storage";

const UI_SETTINGS_SCHEMA_VERSION: u32 = 0;

/// Visual glitch strength chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualIntensity {
    Low,
    #[default]
    Medium,
    High,
}

impl VisualIntensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Numeric glitch level used by text effects (1..=3).
    pub fn glitch_level(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

/// Unknown visual intensity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualIntensityParseError(pub String);

impl Display for VisualIntensityParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown visual intensity `{}`; expected low|medium|high",
            self.0
        )
    }
}

impl Error for VisualIntensityParseError {}

impl FromStr for VisualIntensity {
    type Err = VisualIntensityParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(VisualIntensityParseError(value.to_string())),
        }
    }
}

/// User-facing rendering preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSettings {
    pub visual_intensity: VisualIntensity,
    pub glitch_enabled: bool,
    pub ambient_mode: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            visual_intensity: VisualIntensity::Medium,
            glitch_enabled: true,
            ambient_mode: true,
        }
    }
}

impl UiSettings {
    /// Glitch level actually rendered; zero when glitches are disabled.
    pub fn effective_glitch_level(&self) -> u8 {
        if self.glitch_enabled {
            self.visual_intensity.glitch_level()
        } else {
            0
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedUiSettings {
    state: UiSettings,
    #[serde(default)]
    version: u32,
}

/// Settings owner that saves after every change.
pub struct UiSettingsStore<K: KeyValueStore> {
    store: K,
    settings: UiSettings,
}

impl<K: KeyValueStore> UiSettingsStore<K> {
    /// Loads stored settings, falling back to defaults on absence or damage.
    pub fn load(store: K) -> Self {
        let settings = match store.get(UI_SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedUiSettings>(&raw) {
                Ok(persisted) => persisted.state,
                Err(err) => {
                    warn!("event=settings_load module=settings status=rejected error_code=malformed error={err}");
                    UiSettings::default()
                }
            },
            Ok(None) => UiSettings::default(),
            Err(err) => {
                warn!("event=settings_load module=settings status=error error_code=read_failed error={err}");
                UiSettings::default()
            }
        };
        Self { store, settings }
    }

    pub fn settings(&self) -> UiSettings {
        self.settings
    }

    pub fn set_visual_intensity(&mut self, level: VisualIntensity) {
        self.settings.visual_intensity = level;
        self.save();
    }

    pub fn set_glitch_enabled(&mut self, enabled: bool) {
        self.settings.glitch_enabled = enabled;
        self.save();
    }

    pub fn set_ambient_mode(&mut self, enabled: bool) {
        self.settings.ambient_mode = enabled;
        self.save();
    }

    fn save(&self) {
        let persisted = PersistedUiSettings {
            state: self.settings,
            version: UI_SETTINGS_SCHEMA_VERSION,
        };
        let result = serde_json::to_string(&persisted)
            .map_err(|err| err.to_string())
            .and_then(|json| {
                self.store
                    .set(UI_SETTINGS_STORAGE_KEY, &json)
                    .map_err(|err| err.to_string())
            });
        match result {
            Ok(()) => info!(
                "event=settings_save module=settings status=ok visual_intensity={} glitch_enabled={} ambient_mode={}",
                self.settings.visual_intensity.as_str(),
                self.settings.glitch_enabled,
                self.settings.ambient_mode
            ),
            Err(err) => warn!("event=settings_save module=settings status=error error={err}"),
        }
    }
}
