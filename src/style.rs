use egui::Color32;

use crate::error::ConfigError;
use crate::stroke::StrokeStyle;

/// Fixed, cyclically ordered set of stroke colors
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color32>,
}

impl Palette {
    pub fn new(colors: Vec<Color32>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![Color32::BLACK, Color32::from_rgb(0xfc, 0x03, 0x03)],
        }
    }
}

/// Fixed, cyclically ordered set of stroke widths
#[derive(Debug, Clone, PartialEq)]
pub struct WidthSet {
    widths: Vec<f32>,
}

impl WidthSet {
    pub fn new(widths: Vec<f32>) -> Result<Self, ConfigError> {
        if widths.is_empty() {
            return Err(ConfigError::EmptyWidths);
        }
        if let Some(&bad) = widths.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(ConfigError::InvalidWidth(bad));
        }
        Ok(Self { widths })
    }

    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }
}

impl Default for WidthSet {
    fn default() -> Self {
        Self {
            widths: vec![1.0, 3.0, 6.0],
        }
    }
}

/// The color and width applied to strokes that have not started yet.
///
/// Owned by the session and read once per stroke, when the stroke begins.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleState {
    palette: Palette,
    widths: WidthSet,
    color_index: usize,
    width_index: usize,
}

impl StyleState {
    pub fn new(palette: Palette, widths: WidthSet) -> Self {
        Self {
            palette,
            widths,
            color_index: 0,
            width_index: 0,
        }
    }

    /// Advance to the next color, wrapping after the last
    pub fn cycle_color(&mut self) -> Color32 {
        self.color_index = (self.color_index + 1) % self.palette.len();
        self.color()
    }

    /// Advance to the next width, wrapping after the last
    pub fn cycle_width(&mut self) -> f32 {
        self.width_index = (self.width_index + 1) % self.widths.len();
        self.width()
    }

    pub fn current(&self) -> StrokeStyle {
        StrokeStyle::new(self.color(), self.width())
    }

    pub fn color(&self) -> Color32 {
        self.palette.colors[self.color_index]
    }

    pub fn width(&self) -> f32 {
        self.widths.widths[self.width_index]
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn width_set(&self) -> &WidthSet {
        &self.widths
    }
}

impl Default for StyleState {
    fn default() -> Self {
        Self::new(Palette::default(), WidthSet::default())
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional)
pub fn parse_hex_color(text: &str) -> Result<Color32, ConfigError> {
    let invalid = || ConfigError::InvalidColor(text.to_owned());
    let hex = text.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Color32::from_rgba_unmultiplied(r, g, b, a))
}
