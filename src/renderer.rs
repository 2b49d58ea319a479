use image::RgbaImage;

use crate::background::{Background, Surface, blend_pixel};
use crate::document::Drawing;
use crate::model::StrokeModel;
use crate::stroke::{Bounds, Point, StrokeView, calculate_bounds};

/// A rasterized composition of background and strokes at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    image: RgbaImage,
}

impl Scene {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn surface(&self) -> Surface {
        Surface::new(self.width(), self.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Convert for upload as an egui texture
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.image.as_raw(),
        )
    }
}

/// Composite `strokes` over `background`, back to front.
///
/// Pure: every call repaints everything from scratch.
pub fn render<'a>(
    strokes: impl IntoIterator<Item = StrokeView<'a>>,
    background: &Background,
    surface: Surface,
) -> Scene {
    let mut image = background.fit_to(surface);
    for stroke in strokes {
        paint_stroke(&mut image, stroke);
    }
    Scene { image }
}

/// Render the finalized strokes of `drawing` only
pub fn render_drawing(drawing: &Drawing, background: &Background, surface: Surface) -> Scene {
    render(drawing.strokes().iter().map(|stroke| stroke.view()), background, surface)
}

/// Rasterize one stroke as an anti-aliased polyline with round joins and caps.
///
/// Coverage is accumulated per stroke before blending, so overlapping
/// segments of the same stroke do not darken each other.
pub fn paint_stroke(canvas: &mut RgbaImage, stroke: StrokeView<'_>) {
    let Some(&first) = stroke.points.first() else {
        return;
    };
    let half = f64::from(stroke.style.width).max(1.0) / 2.0;
    // One pixel of feathering for anti-aliasing
    let reach = half + 0.5;

    let Some(area) = PixelRect::covering(calculate_bounds(stroke.points, reach), canvas) else {
        return;
    };

    let mut coverage = vec![0.0_f32; area.len()];
    let segments = stroke.points.windows(2).map(|w| (w[0], w[1]));
    let dot = (stroke.points.len() == 1).then_some((first, first));

    for (a, b) in segments.chain(dot) {
        let Some(seg) = PixelRect::covering(calculate_bounds(&[a, b], reach), canvas) else {
            continue;
        };

        for y in seg.y0..seg.y1 {
            for x in seg.x0..seg.x1 {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let cover = (reach - center.distance_to_segment(a, b)).clamp(0.0, 1.0) as f32;
                let slot = &mut coverage[area.index(x, y)];
                *slot = slot.max(cover);
            }
        }
    }

    let [r, g, b, a] = stroke.style.color.to_srgba_unmultiplied();
    let color_alpha = f32::from(a) / 255.0;
    for y in area.y0..area.y1 {
        for x in area.x0..area.x1 {
            let cover = coverage[area.index(x, y)];
            if cover > 0.0 {
                blend_pixel(canvas.get_pixel_mut(x, y), [r, g, b], cover * color_alpha);
            }
        }
    }
}

/// Half-open pixel rectangle clipped to the canvas
struct PixelRect {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl PixelRect {
    fn covering(bounds: Bounds, canvas: &RgbaImage) -> Option<Self> {
        let clip = |v: f64, limit: u32| v.clamp(0.0, f64::from(limit)) as u32;
        let rect = Self {
            x0: clip(bounds.min.x.floor(), canvas.width()),
            y0: clip(bounds.min.y.floor(), canvas.height()),
            x1: clip(bounds.max.x.ceil(), canvas.width()),
            y1: clip(bounds.max.y.ceil(), canvas.height()),
        };
        (rect.x0 < rect.x1 && rect.y0 < rect.y1).then_some(rect)
    }

    fn len(&self) -> usize {
        ((self.x1 - self.x0) * (self.y1 - self.y0)) as usize
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y - self.y0) * (self.x1 - self.x0) + (x - self.x0)) as usize
    }
}

/// Key describing what a cached composite was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    surface: Surface,
    background_id: u64,
    revision: u64,
}

#[derive(Debug)]
struct CachedComposite {
    key: CacheKey,
    /// Number of finalized strokes already painted into `image`
    painted: usize,
    image: RgbaImage,
}

/// Incremental renderer.
///
/// Keeps the background plus all finalized strokes composited in a buffer.
/// Strokes appended since the last frame are painted onto it; undo and clear
/// change the drawing revision, which rebuilds the buffer. Each frame then
/// costs one buffer copy plus the active stroke, independent of how many
/// strokes the drawing holds. Output is identical to [`render`].
#[derive(Debug, Default)]
pub struct Renderer {
    cache: Option<CachedComposite>,
    rebuilds: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the model: finalized strokes from the cache, then the active stroke
    pub fn render(&mut self, model: &StrokeModel, background: &Background, surface: Surface) -> Scene {
        let drawing = model.drawing();
        let composite = self.composite(drawing, background, surface);

        let mut image = composite.clone();
        if let Some(active) = model.active_stroke() {
            paint_stroke(&mut image, active.view());
        }
        Scene { image }
    }

    /// How many times the composite was rebuilt from scratch
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    fn composite(&mut self, drawing: &Drawing, background: &Background, surface: Surface) -> &RgbaImage {
        let key = CacheKey {
            surface,
            background_id: background.id(),
            revision: drawing.revision(),
        };

        let stale = self
            .cache
            .as_ref()
            .is_none_or(|cache| cache.key != key || cache.painted > drawing.len());
        if stale {
            log::debug!("Rebuilding stroke composite at {}x{}", surface.width, surface.height);
            self.rebuilds += 1;
            self.cache = None;
        }

        let cache = self.cache.get_or_insert_with(|| CachedComposite {
            key,
            painted: 0,
            image: background.fit_to(surface),
        });
        for stroke in &drawing.strokes()[cache.painted..] {
            paint_stroke(&mut cache.image, stroke.view());
        }
        cache.painted = drawing.len();
        &cache.image
    }
}
