use egui::Color32;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::id_generator;

/// A position in surface-local coordinates. No bounds are enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from this point to the segment `a..b`
    pub fn distance_to_segment(self, a: Point, b: Point) -> f64 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return (self.x - a.x).hypot(self.y - a.y);
        }

        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        let (px, py) = (a.x + t * dx, a.y + t * dy);
        (self.x - px).hypot(self.y - py)
    }
}

impl From<egui::Pos2> for Point {
    fn from(pos: egui::Pos2) -> Self {
        Self::new(f64::from(pos.x), f64::from(pos.y))
    }
}

/// Visual attributes captured when a stroke begins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color32,
    pub width: f32,
}

impl StrokeStyle {
    pub fn new(color: Color32, width: f32) -> Self {
        Self { color, width }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

// Immutable stroke, shared between the drawing and the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: u64,
    points: Vec<Point>,
    style: StrokeStyle,
}

// Stroke still following the pointer
#[derive(Debug, Clone)]
pub struct MutableStroke {
    id: u64,
    points: Vec<Point>,
    style: StrokeStyle,
}

pub type StrokeRef = Arc<Stroke>;

/// Borrowed view of a finalized or in-progress stroke, as the renderer sees it
#[derive(Debug, Clone, Copy)]
pub struct StrokeView<'a> {
    pub points: &'a [Point],
    pub style: StrokeStyle,
}

impl Stroke {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn color(&self) -> Color32 {
        self.style.color
    }

    pub fn width(&self) -> f32 {
        self.style.width
    }

    /// A single-point stroke, drawn as a dot
    pub fn is_dot(&self) -> bool {
        self.points.len() < 2
    }

    pub fn view(&self) -> StrokeView<'_> {
        StrokeView {
            points: &self.points,
            style: self.style,
        }
    }
}

impl MutableStroke {
    /// Start a stroke at `origin`. A stroke always holds at least one point.
    pub fn new(origin: Point, style: StrokeStyle) -> Self {
        Self {
            id: id_generator::generate_id(),
            points: vec![origin],
            style,
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn view(&self) -> StrokeView<'_> {
        StrokeView {
            points: &self.points,
            style: self.style,
        }
    }

    // Freeze into an immutable stroke
    pub fn finish(self) -> Stroke {
        Stroke {
            id: self.id,
            points: self.points,
            style: self.style,
        }
    }

    pub fn finish_ref(self) -> StrokeRef {
        Arc::new(self.finish())
    }
}

/// Bounds of `points`, grown by `padding` on every side
pub(crate) fn calculate_bounds(points: &[Point], padding: f64) -> Bounds {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);

    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }

    Bounds {
        min: Point::new(min.x - padding, min.y - padding),
        max: Point::new(max.x + padding, max.y + padding),
    }
}
