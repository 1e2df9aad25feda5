//! Engine configuration types

use super::{Config, ConfigError};
use crate::debug::{OverlayPosition, OverlayStats};
use crate::surface::SurfaceOptions;
use crate::viewport::Orientation;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Enables the debug overlay and per-frame stat collection
    pub debug: bool,

    /// Clear colour as 0xRRGGBB
    pub background_color: u32,

    /// Surface creation settings
    pub surface: SurfaceConfig,

    /// Design resolution and device classification
    pub viewport: ViewportConfig,

    /// Debug overlay layout
    pub debug_overlay: DebugOverlayConfig,

    /// Asset loading settings
    pub assets: AssetConfig,

    /// Frame loop settings
    pub frame: FrameConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: cfg!(debug_assertions),
            background_color: 0x1099bb,
            surface: SurfaceConfig::default(),
            viewport: ViewportConfig::default(),
            debug_overlay: DebugOverlayConfig::default(),
            assets: AssetConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a RON document
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let viewport = &self.viewport;
        if viewport.design_width <= 0.0 || viewport.design_height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "design size must be positive, got {}x{}",
                viewport.design_width, viewport.design_height
            )));
        }
        if viewport.tablet_threshold >= viewport.desktop_threshold {
            return Err(ConfigError::Invalid(format!(
                "tablet_threshold ({}) must be below desktop_threshold ({})",
                viewport.tablet_threshold, viewport.desktop_threshold
            )));
        }
        if self.debug_overlay.refresh_interval < 0.0 {
            return Err(ConfigError::Invalid(
                "debug_overlay.refresh_interval must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Options handed to the rendering surface
    pub fn surface_options(&self) -> SurfaceOptions {
        SurfaceOptions {
            background_color: self.background_color,
            width: self.surface.width,
            height: self.surface.height,
            resolution: self.surface.resolution,
            antialias: self.surface.antialias,
        }
    }
}

/// Surface creation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Initial width when the host has not sized the mount point yet
    pub width: u32,
    /// Initial height when the host has not sized the mount point yet
    pub height: u32,
    /// Device pixel ratio
    pub resolution: f32,
    /// Antialiasing
    pub antialias: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            resolution: 1.0,
            antialias: true,
        }
    }
}

/// Viewport adaptation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width of the design space
    pub design_width: f32,
    /// Height of the design space
    pub design_height: f32,
    /// Use a uniform, letterboxed scale instead of 1:1
    pub maintain_aspect_ratio: bool,
    /// Orientation reported while the window has no area
    pub default_orientation: Orientation,
    /// Longer side below this is `mobile`
    pub tablet_threshold: f32,
    /// Longer side below this (and not mobile) is `tablet`
    pub desktop_threshold: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            design_width: 1920.0,
            design_height: 1080.0,
            maintain_aspect_ratio: true,
            default_orientation: Orientation::Landscape,
            tablet_threshold: 768.0,
            desktop_threshold: 1024.0,
        }
    }
}

/// Debug overlay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOverlayConfig {
    /// Screen corner the overlay anchors to
    pub position: OverlayPosition,
    /// Which stats are shown
    pub stats: OverlayStats,
    /// Initial visibility
    pub visible: bool,
    /// Seconds between text refreshes
    pub refresh_interval: f32,
}

impl Default for DebugOverlayConfig {
    fn default() -> Self {
        Self {
            position: OverlayPosition::TopLeft,
            stats: OverlayStats::FPS | OverlayStats::ENTITIES | OverlayStats::SCENE,
            visible: true,
            refresh_interval: 0.5,
        }
    }
}

/// Asset system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Prefix joined onto relative asset urls
    pub base_path: String,
}

/// Frame loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound for a single frame's delta, in seconds (0 disables the clamp)
    pub max_delta_seconds: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_delta_seconds: 0.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            debug = true

            [viewport]
            design_width = 1280.0
            design_height = 720.0
            default_orientation = "portrait"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.viewport.design_width, 1280.0);
        assert_eq!(config.viewport.default_orientation, Orientation::Portrait);
        assert_eq!(config.viewport.tablet_threshold, 768.0);
        assert_eq!(config.debug_overlay, DebugOverlayConfig::default());
    }

    #[test]
    fn test_ron_roundtrip_of_overlay_stats() {
        let mut config = EngineConfig::default();
        config.debug_overlay.stats = OverlayStats::FPS | OverlayStats::VIEWPORT;
        let text = ron::ser::to_string(&config).unwrap();
        let parsed = EngineConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed.debug_overlay.stats, config.debug_overlay.stats);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = EngineConfig::default();
        config.viewport.tablet_threshold = 2000.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let mut config = EngineConfig::default();
        config.background_color = 0x000000;
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "debug: true\n").unwrap();

        assert!(matches!(
            EngineConfig::load_from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            EngineConfig::default().save_to_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::load_from_file(dir.path().join("absent.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
