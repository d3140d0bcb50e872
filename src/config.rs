use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::CAMERA_SPEED;
use crate::content::canvas::MAX_CANVAS_SIDE;
use crate::content::CityStats;
use crate::error::ConfigError;
use crate::interaction::DEFAULT_TIE_TOLERANCE;
use crate::navigator::Viewpoint;

/// Runtime settings; every field falls back to the furnished office defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeConfig {
    pub viewpoints: Vec<Viewpoint>,
    pub initial_view: String,
    pub transition_ms: u64,
    /// World units per second
    pub move_speed: f32,
    pub panel_texture: (u32, u32),
    pub preview_scale: f32,
    pub cities: Vec<CityStats>,
    pub reply_delay_ms: u64,
    pub tie_tolerance: f32,
}

impl Default for OfficeConfig {
    fn default() -> Self {
        Self {
            viewpoints: Viewpoint::defaults(),
            initial_view: "overview".to_string(),
            transition_ms: 1000,
            move_speed: CAMERA_SPEED,
            panel_texture: (1024, 640),
            preview_scale: 0.25,
            cities: CityStats::defaults(),
            reply_delay_ms: 1000,
            tie_tolerance: DEFAULT_TIE_TOLERANCE,
        }
    }
}

impl OfficeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: OfficeConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewpoints.is_empty() {
            return Err(ConfigError::Invalid("no viewpoints defined".into()));
        }
        let mut seen = HashSet::new();
        for view in &self.viewpoints {
            if !seen.insert(view.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate viewpoint '{}'", view.name)));
            }
        }
        if !seen.contains(self.initial_view.as_str()) {
            return Err(ConfigError::Invalid(format!("initial view '{}' is not defined", self.initial_view)));
        }
        if self.transition_ms == 0 {
            return Err(ConfigError::Invalid("transition_ms must be positive".into()));
        }
        if self.panel_texture.0 == 0 || self.panel_texture.1 == 0 {
            return Err(ConfigError::Invalid("panel texture must have non-zero size".into()));
        }
        if self.panel_texture.0 > MAX_CANVAS_SIDE || self.panel_texture.1 > MAX_CANVAS_SIDE {
            return Err(ConfigError::Invalid(format!(
                "panel texture {}x{} exceeds {} pixels per side",
                self.panel_texture.0, self.panel_texture.1, MAX_CANVAS_SIDE
            )));
        }
        if !(self.preview_scale > 0.0 && self.preview_scale <= 1.0) {
            return Err(ConfigError::Invalid("preview_scale must be in (0, 1]".into()));
        }
        if !self.move_speed.is_finite() || self.move_speed < 0.0 {
            return Err(ConfigError::Invalid("move_speed must be a non-negative number".into()));
        }
        Ok(())
    }

    pub fn transition_seconds(&self) -> f64 {
        self.transition_ms as f64 / 1000.0
    }

    pub fn reply_delay_seconds(&self) -> f64 {
        self.reply_delay_ms as f64 / 1000.0
    }
}
