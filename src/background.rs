use egui::Color32;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::id_generator;

/// Pixel dimensions of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface that has not been laid out yet has no pixels to capture
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The fixed image drawn beneath every stroke.
///
/// Loaded once and never modified. `paper` fills the surface first, then the
/// image is stretched over it at `opacity`.
#[derive(Debug, Clone)]
pub struct Background {
    id: u64,
    image: Option<Arc<RgbaImage>>,
    paper: Color32,
    opacity: f32,
}

impl Background {
    /// A plain sheet of `paper` color
    pub fn plain(paper: Color32) -> Self {
        Self {
            id: id_generator::generate_id(),
            image: None,
            paper,
            opacity: 1.0,
        }
    }

    pub fn from_image(image: RgbaImage, paper: Color32, opacity: f32) -> Self {
        Self {
            id: id_generator::generate_id(),
            image: Some(Arc::new(image)),
            paper,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Decode an encoded image (PNG, JPEG, ...)
    pub fn from_bytes(bytes: &[u8], paper: Color32, opacity: f32) -> Result<Self, ConfigError> {
        let decoded = image::load_from_memory(bytes)?;
        log::debug!("Decoded background image: {}x{}", decoded.width(), decoded.height());
        Ok(Self::from_image(decoded.to_rgba8(), paper, opacity))
    }

    pub fn load(path: &Path, paper: Color32, opacity: f32) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path)?;
        log::info!("Loading background from {} ({} bytes)", path.display(), bytes.len());
        Self::from_bytes(&bytes, paper, opacity)
    }

    /// Identity of this background, stable across clones
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Source dimensions, if an image is present
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.dimensions())
    }

    pub fn paper(&self) -> Color32 {
        self.paper
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Paint the background over the whole of `surface`
    pub fn fit_to(&self, surface: Surface) -> RgbaImage {
        let [r, g, b, a] = self.paper.to_srgba_unmultiplied();
        let mut canvas = RgbaImage::from_pixel(surface.width, surface.height, Rgba([r, g, b, a]));

        let Some(image) = &self.image else {
            return canvas;
        };
        if surface.is_empty() || self.opacity <= 0.0 {
            return canvas;
        }

        let fitted = if image.dimensions() == (surface.width, surface.height) {
            (**image).clone()
        } else {
            imageops::resize(&**image, surface.width, surface.height, FilterType::Triangle)
        };

        for (dst, src) in canvas.pixels_mut().zip(fitted.pixels()) {
            let alpha = f32::from(src[3]) / 255.0 * self.opacity;
            blend_pixel(dst, [src[0], src[1], src[2]], alpha);
        }
        canvas
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::plain(Color32::WHITE)
    }
}

/// Source-over blend of an opaque color at `alpha` onto `dst`
pub(crate) fn blend_pixel(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let alpha = alpha.min(1.0);
    let dst_alpha = f32::from(dst[3]) / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);

    for channel in 0..3 {
        let s = f32::from(src[channel]);
        let d = f32::from(dst[channel]);
        let value = (s * alpha + d * dst_alpha * (1.0 - alpha)) / out_alpha;
        dst[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}
