//! Game settings and preferences
//!
//! Persisted separately from the game in LocalStorage. The session itself is
//! never saved.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Rain drops simulated and drawn
    pub fn rain_drops(&self) -> usize {
        match self {
            QualityPreset::Low => 2_000,
            QualityPreset::Medium => 8_000,
            QualityPreset::High => 25_000,
        }
    }

    /// Grass blades scattered over the island top
    pub fn grass_blades(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 800,
            QualityPreset::High => 1_500,
        }
    }
}

/// Candidate file names for the looped ambient track, tried in order
pub const DEFAULT_AMBIENT_TRACKS: &[&str] = &[
    "assets/storm_ambience.mp3",
    "assets/storm_ambience.ogg",
    "assets/ambient.mp3",
    "ambient.mp3",
];

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Ambient track and noise beds volume (0.0 - 1.0)
    pub ambient_volume: f32,
    /// Mute all audio
    pub muted: bool,
    /// Ambient track candidates, tried in order
    pub ambient_tracks: Vec<String>,

    // === Accessibility ===
    /// Reduced motion (no lightning flashes)
    pub reduced_motion: bool,

    /// Fixed world seed (random per page load when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            master_volume: 0.8,
            sfx_volume: 1.0,
            ambient_volume: 0.7,
            muted: false,
            ambient_tracks: DEFAULT_AMBIENT_TRACKS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            reduced_motion: false,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check volume ranges and the track list
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("master_volume", self.master_volume),
            ("sfx_volume", self.sfx_volume),
            ("ambient_volume", self.ambient_volume),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::OutOfRange { field, value });
            }
        }
        if self.ambient_tracks.is_empty() {
            return Err(SettingsError::NoAmbientTracks);
        }
        Ok(())
    }

    /// Effective effects volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective ambient volume (respects mute)
    pub fn effective_ambient_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.ambient_volume
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "island_storm_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
