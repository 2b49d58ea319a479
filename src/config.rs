use egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::background::Background;
use crate::error::ConfigError;
use crate::style::{Palette, StyleState, WidthSet, parse_hex_color};

/// Raster encoding used when saving a drawing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    /// File extension including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
        }
    }
}

/// How and where drawings are saved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// Encoding quality in `0..=1`. Only JPEG uses it.
    pub quality: f32,
    pub filename_prefix: String,
    pub output_dir: PathBuf,
    /// Clear the canvas once a save has been confirmed
    pub clear_after_export: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 0.8,
            filename_prefix: "drawing_".to_owned(),
            output_dir: PathBuf::from("drawings"),
            clear_after_export: true,
        }
    }
}

/// Application configuration, read from JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Stroke colors as `#rrggbb`, cycled in order
    pub palette: Vec<String>,
    /// Stroke widths, cycled in order
    pub widths: Vec<f32>,
    pub paper_color: String,
    pub background_path: Option<PathBuf>,
    pub background_opacity: f32,
    pub export: ExportConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            palette: vec!["#000000".to_owned(), "#fc0303".to_owned()],
            widths: vec![1.0, 3.0, 6.0],
            paper_color: "#ffffff".to_owned(),
            background_path: None,
            background_opacity: 1.0,
            export: ExportConfig::default(),
        }
    }
}

impl SketchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        log::info!("Loaded config from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.palette()?;
        WidthSet::new(self.widths.clone())?;
        parse_hex_color(&self.paper_color)?;

        if !(0.0..=1.0).contains(&self.background_opacity) {
            return Err(ConfigError::InvalidOpacity(self.background_opacity));
        }
        if !(0.0..=1.0).contains(&self.export.quality) {
            return Err(ConfigError::InvalidQuality(self.export.quality));
        }
        Ok(())
    }

    pub fn palette(&self) -> Result<Palette, ConfigError> {
        let colors = self
            .palette
            .iter()
            .map(|hex| parse_hex_color(hex))
            .collect::<Result<Vec<_>, _>>()?;
        Palette::new(colors)
    }

    /// Initial style: first color, first width
    pub fn style_state(&self) -> Result<StyleState, ConfigError> {
        Ok(StyleState::new(self.palette()?, WidthSet::new(self.widths.clone())?))
    }

    pub fn paper_color(&self) -> Result<Color32, ConfigError> {
        parse_hex_color(&self.paper_color)
    }

    /// Load the configured background, or plain paper when none is set
    pub fn background(&self) -> Result<Background, ConfigError> {
        let paper = self.paper_color()?;
        match &self.background_path {
            Some(path) => Background::load(path, paper, self.background_opacity),
            None => Ok(Background::plain(paper)),
        }
    }
}
