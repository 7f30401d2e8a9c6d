//! Front-end settings and tuning
//!
//! Persisted in LocalStorage as JSON. Native builds always use defaults.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Particle background density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DensityPreset {
    Small,
    Medium,
    #[default]
    Large,
}

impl DensityPreset {
    /// Pick a preset from the viewport width (phones, tablets, desktops)
    pub fn for_viewport(width: f32) -> Self {
        if width < 480.0 {
            DensityPreset::Small
        } else if width < 768.0 {
            DensityPreset::Medium
        } else {
            DensityPreset::Large
        }
    }

    pub fn particle_count(&self) -> usize {
        match self {
            DensityPreset::Small => 20,
            DensityPreset::Medium => 30,
            DensityPreset::Large => 50,
        }
    }

    /// Upper bound of the random extra particle size
    pub fn particle_size(&self) -> f32 {
        match self {
            DensityPreset::Small => 0.8,
            DensityPreset::Medium | DensityPreset::Large => 1.0,
        }
    }

    pub fn particle_speed(&self) -> f32 {
        match self {
            DensityPreset::Small => 0.2,
            DensityPreset::Medium => 0.25,
            DensityPreset::Large => 0.3,
        }
    }

    /// Particles closer than this are joined by a line
    pub fn connection_distance(&self) -> f32 {
        match self {
            DensityPreset::Small => 80.0,
            DensityPreset::Medium => 100.0,
            DensityPreset::Large => 120.0,
        }
    }
}

/// Which cover/page transition backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransitionPreference {
    /// Rich unless reduced motion is requested
    #[default]
    Auto,
    Rich,
    Basic,
}

/// Mini-game tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_bottom_offset: f32,
    pub paddle_band_slack: f32,
    pub ball_radius: f32,
    pub launch_speed_y: f32,
    pub launch_spread_x: f32,
    pub steer_factor: f32,
    pub max_balls: usize,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_bottom_offset: PADDLE_BOTTOM_OFFSET,
            paddle_band_slack: PADDLE_BAND_SLACK,
            ball_radius: BALL_RADIUS,
            launch_speed_y: LAUNCH_SPEED_Y,
            launch_spread_x: LAUNCH_SPREAD_X,
            steer_factor: STEER_FACTOR,
            max_balls: MAX_BALLS,
        }
    }
}

/// Page navigation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavTuning {
    pub swipe_threshold: f32,
}

impl Default for NavTuning {
    fn default() -> Self {
        Self {
            swipe_threshold: SWIPE_THRESHOLD,
        }
    }
}

/// Particle background options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundSettings {
    pub enabled: bool,
    /// Fixed density; `None` picks from the viewport width
    pub density: Option<DensityPreset>,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            density: None,
        }
    }
}

/// Settings validation/parse failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("malformed settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(&'static str),
}

/// User preferences and tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub game: GameTuning,
    pub navigation: NavTuning,
    pub background: BackgroundSettings,
    pub transitions: TransitionPreference,

    // === Accessibility ===
    /// Reduced motion (basic transitions, no particle background)
    pub reduced_motion: bool,
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "folio_settings";

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let g = &self.game;
        if g.paddle_width <= 0.0 || g.paddle_height <= 0.0 {
            return Err(SettingsError::Invalid("paddle size must be positive"));
        }
        if g.ball_radius <= 0.0 {
            return Err(SettingsError::Invalid("ball radius must be positive"));
        }
        if g.max_balls == 0 {
            return Err(SettingsError::Invalid("max_balls must be at least 1"));
        }
        if self.navigation.swipe_threshold <= 0.0 {
            return Err(SettingsError::Invalid("swipe threshold must be positive"));
        }
        Ok(())
    }

    /// Whether the rich (tweened) transition backend should be used
    pub fn wants_rich_transitions(&self) -> bool {
        match self.transitions {
            TransitionPreference::Basic => false,
            TransitionPreference::Rich => !self.reduced_motion,
            TransitionPreference::Auto => !self.reduced_motion,
        }
    }

    /// Effective particle background (respects reduced_motion)
    pub fn effective_background(&self) -> bool {
        self.background.enabled && !self.reduced_motion
    }

    /// Density for the given viewport width
    pub fn density_for(&self, viewport_width: f32) -> DensityPreset {
        self.background
            .density
            .unwrap_or_else(|| DensityPreset::for_viewport(viewport_width))
    }

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
                    Err(e) => log::warn!("Replacing stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        let settings = Self::default();
        // Leave an editable copy behind (and overwrite a broken one)
        settings.save();
        settings
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

    /// Native builds have no storage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"reduced_motion": true}"#).unwrap();
        assert!(settings.reduced_motion);
        assert_eq!(settings.game, GameTuning::default());
        assert_eq!(settings.navigation.swipe_threshold, SWIPE_THRESHOLD);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{"game": {"max_balls": 0}}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));

        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_reduced_motion_forces_basic() {
        let mut settings = Settings::default();
        assert!(settings.wants_rich_transitions());
        assert!(settings.effective_background());

        settings.reduced_motion = true;
        assert!(!settings.wants_rich_transitions());
        assert!(!settings.effective_background());

        settings.reduced_motion = false;
        settings.transitions = TransitionPreference::Basic;
        assert!(!settings.wants_rich_transitions());
    }

    #[test]
    fn test_density_for_viewport() {
        assert_eq!(DensityPreset::for_viewport(375.0), DensityPreset::Small);
        assert_eq!(DensityPreset::for_viewport(600.0), DensityPreset::Medium);
        assert_eq!(DensityPreset::for_viewport(1440.0), DensityPreset::Large);

        let mut settings = Settings::default();
        settings.background.density = Some(DensityPreset::Small);
        assert_eq!(settings.density_for(1440.0), DensityPreset::Small);
    }
}
