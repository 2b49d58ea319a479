use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage};

use crate::background::blend_pixel;
use crate::config::{ExportConfig, ExportFormat};
use crate::document::Drawing;
use crate::error::{SketchError, SketchResult};
use crate::renderer::Scene;

/// Raster encoding settings for a capture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capture {
    format: ExportFormat,
    quality: f32,
}

impl Capture {
    pub fn new(format: ExportFormat, quality: f32) -> Self {
        Self {
            format,
            quality: quality.clamp(0.0, 1.0),
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// JPEG quality on the encoder's 1..=100 scale
    fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Encode the pixels of `scene`.
    ///
    /// Fails with [`SketchError::CaptureFailure`] when the scene has no pixels
    /// (the surface was never laid out) or the encoder rejects the frame.
    pub fn encode(&self, scene: &Scene) -> SketchResult<Vec<u8>> {
        if scene.surface().is_empty() {
            return Err(SketchError::CaptureFailure(format!(
                "surface has no pixels ({}x{})",
                scene.width(),
                scene.height()
            )));
        }

        let (width, height) = (scene.width(), scene.height());
        let mut bytes = Vec::new();
        let result = match self.format {
            ExportFormat::Jpeg => {
                let rgb = flatten(scene.image());
                JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality()).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(
                scene.image().as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        };

        result.map_err(|err| SketchError::CaptureFailure(err.to_string()))?;
        log::debug!("Encoded {}x{} scene as {:?}: {} bytes", width, height, self.format, bytes.len());
        Ok(bytes)
    }
}

impl Default for Capture {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for Capture {
    fn from(config: &ExportConfig) -> Self {
        Self::new(config.format, config.quality)
    }
}

/// Composite over opaque white. JPEG has no alpha channel.
fn flatten(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let src = image.get_pixel(x, y);
        let mut out = Rgba([255, 255, 255, 255]);
        blend_pixel(&mut out, [src[0], src[1], src[2]], f32::from(src[3]) / 255.0);
        Rgb([out[0], out[1], out[2]])
    })
}

/// Decode saved bytes into a preview no larger than `max_edge` on its
/// longest side
pub fn preview(bytes: &[u8], max_edge: u32) -> SketchResult<RgbaImage> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|err| SketchError::CaptureFailure(err.to_string()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let longest = width.max(height);
    if longest <= max_edge {
        return Ok(decoded);
    }
    let scale = max_edge as f32 / longest as f32;
    let (w, h) = (
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    );
    Ok(imageops::resize(&decoded, w, h, FilterType::Triangle))
}

/// Capture `scene` as encoded bytes.
///
/// An empty drawing fails with [`SketchError::EmptyDrawing`] before anything
/// is encoded.
pub fn export(drawing: &Drawing, scene: &Scene, capture: &Capture) -> SketchResult<Vec<u8>> {
    if drawing.is_empty() {
        return Err(SketchError::EmptyDrawing);
    }
    capture.encode(scene)
}
