//! Conversion options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Target slide size presets, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "16:10")]
    Sixteen10,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "wide")]
    Wide,
}

impl AspectRatio {
    /// Target canvas `(width, height)` in inches.
    pub fn size_inches(self) -> (f32, f32) {
        match self {
            AspectRatio::Widescreen => (10.0, 5.625),
            AspectRatio::Sixteen10 => (10.0, 6.25),
            AspectRatio::Standard => (10.0, 7.5),
            AspectRatio::Wide => (13.333, 7.5),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "16:9" | "16x9" => Ok(AspectRatio::Widescreen),
            "16:10" | "16x10" => Ok(AspectRatio::Sixteen10),
            "4:3" | "4x3" => Ok(AspectRatio::Standard),
            "wide" => Ok(AspectRatio::Wide),
            other => Err(Error::Config(format!("unknown aspect ratio preset: {other}"))),
        }
    }
}

/// Constants for estimating the box of text the rendering engine did not
/// measure. Tunable; real measurements always win when available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextEstimation {
    /// Average glyph advance as a fraction of the font size.
    pub char_width: f32,
    /// Advance of CJK / full-width glyphs as a fraction of the font size.
    pub wide_char_width: f32,
    /// Line box height as a multiple of the font size.
    pub line_height: f32,
    /// Widest box an estimate may produce, in source px.
    pub max_width_px: f32,
}

impl Default for TextEstimation {
    fn default() -> Self {
        Self {
            char_width: 0.55,
            wide_char_width: 1.0,
            line_height: 1.2,
            max_width_px: 1200.0,
        }
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub aspect_ratio: AspectRatio,
    pub default_font_face: String,
    /// Points.
    pub default_font_size: f32,
    pub preserve_animations: bool,
    pub title: String,
    pub author: String,
    /// Canvas the source document is rendered at, in px.
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// How long rasterization waits for web fonts before giving up.
    pub font_ready_timeout_ms: u64,
    /// Font files for glyph icons, tried before system fonts.
    pub icon_font_paths: Vec<PathBuf>,
    /// Whether icon families may resolve to installed system fonts.
    pub system_fonts: bool,
    pub estimation: TextEstimation,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            default_font_face: "Arial".to_string(),
            default_font_size: 18.0,
            preserve_animations: true,
            title: String::new(),
            author: String::new(),
            viewport_width: 1280.0,
            viewport_height: 720.0,
            font_ready_timeout_ms: 1500,
            icon_font_paths: Vec::new(),
            system_fonts: true,
            estimation: TextEstimation::default(),
        }
    }
}

impl ConvertConfig {
    /// Load a config from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: ConvertConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(Error::Config(format!(
                "viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        if self.default_font_size <= 0.0 {
            return Err(Error::Config("default_font_size must be positive".to_string()));
        }
        Ok(())
    }

    /// Target canvas `(width, height)` in inches.
    pub fn target_size(&self) -> (f32, f32) {
        self.aspect_ratio.size_inches()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_presets() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap().size_inches(), (10.0, 5.625));
        assert_eq!("4x3".parse::<AspectRatio>().unwrap(), AspectRatio::Standard);
        assert!("3:2".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: ConvertConfig =
            serde_json::from_str(r#"{"aspect_ratio": "4:3", "title": "Deck"}"#).unwrap();
        assert_eq!(config.aspect_ratio, AspectRatio::Standard);
        assert_eq!(config.title, "Deck");
        assert_eq!(config.default_font_face, "Arial");
        assert!(config.preserve_animations);
        assert!(config.icon_font_paths.is_empty() && config.system_fonts);
        assert_eq!(config.estimation, TextEstimation::default());
    }

    #[test]
    fn test_validate_rejects_empty_viewport() {
        let config = ConvertConfig {
            viewport_width: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
