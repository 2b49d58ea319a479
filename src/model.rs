use log::{debug, info, warn};

use crate::document::Drawing;
use crate::error::{SketchError, SketchResult};
use crate::state::GestureState;
use crate::stroke::{MutableStroke, Point, StrokeRef, StrokeStyle, StrokeView};

/// Owns the drawing and the stroke being drawn.
///
/// Gesture lifecycle is `Idle -> Active` on `begin` and `Active -> Idle` on
/// `end`. Operations called in the wrong state return
/// [`SketchError::InvalidGestureState`] and leave the model untouched.
#[derive(Debug, Default)]
pub struct StrokeModel {
    drawing: Drawing,
    state: GestureState,
}

impl StrokeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point` using `style`, captured now and frozen for
    /// the lifetime of the stroke.
    pub fn begin(&mut self, point: Point, style: StrokeStyle) -> SketchResult<()> {
        if self.state.is_active() {
            warn!("Ignoring pointer down at ({}, {}): a stroke is already active", point.x, point.y);
            return Err(self.invalid("begin a stroke"));
        }

        let stroke = MutableStroke::new(point, style);
        debug!("Stroke {} started at ({}, {})", stroke.id(), point.x, point.y);
        self.state = GestureState::Active { stroke };
        Ok(())
    }

    /// Append `point` to the active stroke.
    ///
    /// Returns false without error when idle, so move events delivered after
    /// release are absorbed.
    pub fn extend(&mut self, point: Point) -> bool {
        match self.state.active_stroke_mut() {
            Some(stroke) => {
                stroke.add_point(point);
                true
            }
            None => false,
        }
    }

    /// Finalize the active stroke. A stroke with a single point is kept as a dot.
    pub fn end(&mut self) -> SketchResult<StrokeRef> {
        let Some(stroke) = self.state.take_stroke() else {
            return Err(self.invalid("end a stroke"));
        };

        let stroke = stroke.finish_ref();
        debug!("Stroke {} finished with {} points", stroke.id(), stroke.points().len());
        self.drawing.add_stroke(stroke.clone());
        Ok(stroke)
    }

    /// Remove the most recent finalized stroke.
    ///
    /// No-op while a stroke is active or when the drawing is empty.
    pub fn undo(&mut self) -> Option<StrokeRef> {
        if self.state.is_active() {
            warn!("Ignoring undo while a stroke is being drawn");
            return None;
        }

        let removed = self.drawing.remove_last_stroke();
        if let Some(stroke) = &removed {
            info!("Undid stroke {}, {} remaining", stroke.id(), self.drawing.len());
        }
        removed
    }

    /// Empty the drawing. An active stroke is discarded and the model returns
    /// to idle. Returns the number of finalized strokes removed.
    pub fn clear(&mut self) -> usize {
        if let Some(stroke) = self.state.take_stroke() {
            debug!("Discarding active stroke {} on clear", stroke.id());
        }
        let removed = self.drawing.clear();
        info!("Cleared {} strokes", removed);
        removed
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn active_stroke(&self) -> Option<&MutableStroke> {
        self.state.active_stroke()
    }

    /// Everything that should appear on screen, back to front: the finalized
    /// strokes followed by the active stroke, if any.
    pub fn visible_strokes(&self) -> impl Iterator<Item = StrokeView<'_>> {
        self.drawing
            .strokes()
            .iter()
            .map(|stroke| stroke.view())
            .chain(self.state.active_stroke().map(MutableStroke::view))
    }

    fn invalid(&self, operation: &'static str) -> SketchError {
        SketchError::InvalidGestureState {
            operation,
            state: self.state.name(),
        }
    }
}
