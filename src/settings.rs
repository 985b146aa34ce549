//! Player preferences
//!
//! Read from LocalStorage in the browser; natively the defaults apply, with
//! the API base URL and quality overridable from the environment.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DARTS_PER_GAME, SPARKLE_PARTICLES};

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

    /// Background layer texture size (square)
    pub fn background_size(&self) -> u32 {
        match self {
            QualityPreset::Low => 256,
            QualityPreset::Medium => 512,
            QualityPreset::High => 1024,
        }
    }

    /// Particles spawned per sparkle burst
    pub fn particles_per_burst(&self) -> usize {
        match self {
            QualityPreset::Low => SPARKLE_PARTICLES / 2,
            QualityPreset::Medium => SPARKLE_PARTICLES,
            QualityPreset::High => SPARKLE_PARTICLES * 3 / 2,
        }
    }

    /// Concurrent sparkle bursts before the oldest is retired
    pub fn max_bursts(&self) -> usize {
        match self {
            QualityPreset::Low => 2,
            QualityPreset::Medium => 4,
            QualityPreset::High => 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    /// Sparkle bursts on big hits
    pub sparkles: bool,
    /// Minimize idle drift and dart spin
    pub reduced_motion: bool,
    /// Show FPS counter
    pub show_fps: bool,

    /// Darts requested when starting a game
    pub darts_per_game: u32,
    /// Scoring server origin; empty means same origin
    pub api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            sparkles: true,
            reduced_motion: false,
            show_fps: false,
            darts_per_game: DEFAULT_DARTS_PER_GAME,
            api_base: String::new(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Scale applied to idle reticle drift
    pub fn drift_scale(&self) -> f32 {
        if self.reduced_motion { 0.25 } else { 1.0 }
    }

    /// Scale applied to the cosmetic dart spin
    pub fn spin_scale(&self) -> f32 {
        if self.reduced_motion { 0.3 } else { 1.0 }
    }

    /// Darts per game, never zero
    pub fn darts_per_game(&self) -> u32 {
        self.darts_per_game.max(1)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "carnival_darts_settings";

    /// Native override for the API base URL
    #[allow(dead_code)]
    const API_ENV: &'static str = "CARNIVAL_DARTS_API";

    /// Native override for the quality preset
    #[allow(dead_code)]
    const QUALITY_ENV: &'static str = "CARNIVAL_DARTS_QUALITY";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Defaults, with `CARNIVAL_DARTS_API` as the server origin and
    /// `CARNIVAL_DARTS_QUALITY` as the preset when set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::from_env(
            std::env::var(Self::API_ENV).ok(),
            std::env::var(Self::QUALITY_ENV).ok(),
        )
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    fn from_env(api_base: Option<String>, quality: Option<String>) -> Self {
        let mut settings = match quality.as_deref().map(str::trim) {
            Some(name) => match QualityPreset::from_str(name) {
                Some(preset) => Self::from_preset(preset),
                None => {
                    log::warn!("Unknown quality {name:?}, using Medium");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            settings.api_base = base.trim().to_string();
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(QualityPreset::from_str("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::from_str("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::from_str("ultra"), None);
        assert_eq!(QualityPreset::Low.as_str(), "Low");
    }

    #[test]
    fn test_presets_scale_up() {
        let presets = [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High];
        assert!(presets.windows(2).all(|w| w[0].max_bursts() < w[1].max_bursts()));
        assert!(presets.windows(2).all(|w| w[0].background_size() < w[1].background_size()));
        assert_eq!(QualityPreset::Medium.particles_per_burst(), SPARKLE_PARTICLES);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality": "High"}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.darts_per_game, DEFAULT_DARTS_PER_GAME);
        assert!(settings.sparkles);
    }

    #[test]
    fn test_env_override() {
        assert_eq!(Settings::from_env(None, None).api_base, "");
        assert_eq!(Settings::from_env(Some("  ".into()), None).api_base, "");
        let s = Settings::from_env(Some("http://localhost:8787".into()), Some("high".into()));
        assert_eq!(s.api_base, "http://localhost:8787");
        assert_eq!(s.quality, QualityPreset::High);
        let s = Settings::from_env(None, Some("ultra".into()));
        assert_eq!(s.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_reduced_motion_scales() {
        let mut s = Settings::default();
        assert_eq!(s.drift_scale(), 1.0);
        s.reduced_motion = true;
        assert!(s.drift_scale() < 1.0 && s.spin_scale() < 1.0);
        s.darts_per_game = 0;
        assert_eq!(s.darts_per_game(), 1);
    }
}
