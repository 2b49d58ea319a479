use log::{debug, error, info, warn};
use std::path::PathBuf;

use crate::background::{Background, Surface};
use crate::capture::{self, Capture};
use crate::command::Command;
use crate::config::{ExportConfig, SketchConfig};
use crate::document::Drawing;
use crate::error::{ConfigError, SketchError, SketchResult, StorageError};
use crate::event::{EventBus, SketchEvent};
use crate::input::{InputEvent, PointerPhase};
use crate::model::StrokeModel;
use crate::renderer::{Renderer, Scene};
use crate::storage::{FilenameGenerator, ImageStore, PermissionGate};
use crate::stroke::{Point, StrokeRef};
use crate::style::StyleState;

/// Encoded snapshot waiting to be written by an [`ImageStore`]
#[derive(Debug, Clone)]
pub struct PendingExport {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Outcome of a confirmed save
#[derive(Debug, Clone, PartialEq)]
pub struct SavedDrawing {
    pub path: PathBuf,
    /// Whether the canvas was cleared after saving
    pub cleared: bool,
}

/// One drawing session: the style, the strokes, the background and the
/// export state machine.
///
/// All mutation happens through `&mut self` on the input thread. Every change
/// is announced on [`Session::events`] so the surface knows to redraw.
#[derive(Debug)]
pub struct Session {
    style: StyleState,
    model: StrokeModel,
    background: Background,
    surface: Surface,
    renderer: Renderer,
    capture: Capture,
    filenames: FilenameGenerator,
    clear_after_export: bool,
    /// File name of the export in flight, if any
    exporting: Option<String>,
    events: EventBus,
}

impl Session {
    pub fn new(style: StyleState, background: Background, surface: Surface, export: &ExportConfig) -> Self {
        Self {
            style,
            model: StrokeModel::new(),
            background,
            surface,
            renderer: Renderer::new(),
            capture: Capture::from(export),
            filenames: FilenameGenerator::new(export.filename_prefix.clone()),
            clear_after_export: export.clear_after_export,
            exporting: None,
            events: EventBus::new(),
        }
    }

    pub fn from_config(config: &SketchConfig, surface: Surface) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.style_state()?, config.background()?, surface, &config.export))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Update the surface after a layout change
    pub fn resize(&mut self, surface: Surface) {
        if surface != self.surface {
            debug!("Surface resized to {}x{}", surface.width, surface.height);
            self.surface = surface;
        }
    }

    // ---- gestures ----

    pub fn pointer_down(&mut self, point: Point) -> SketchResult<()> {
        if self.exporting.is_some() {
            warn!("Ignoring pointer down while an export is in progress");
            return Err(SketchError::InvalidGestureState {
                operation: "begin a stroke",
                state: "an export is in progress",
            });
        }

        self.model.begin(point, self.style.current())?;
        if let Some(stroke) = self.model.active_stroke() {
            self.events.emit(SketchEvent::StrokeStarted { stroke_id: stroke.id() });
        }
        Ok(())
    }

    /// Returns whether a point was added
    pub fn pointer_move(&mut self, point: Point) -> bool {
        if !self.model.extend(point) {
            return false;
        }
        if let Some(stroke) = self.model.active_stroke() {
            self.events.emit(SketchEvent::StrokeExtended {
                stroke_id: stroke.id(),
                points: stroke.points().len(),
            });
        }
        true
    }

    pub fn pointer_up(&mut self) -> SketchResult<StrokeRef> {
        let stroke = self.model.end()?;
        self.events.emit(SketchEvent::StrokeFinished {
            stroke_id: stroke.id(),
            points: stroke.points().len(),
        });
        Ok(stroke)
    }

    /// Feed one pointer event. Out-of-order events are logged and dropped.
    ///
    /// Returns whether the scene changed.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        let result = match event.phase {
            PointerPhase::Down => self.pointer_down(event.position),
            PointerPhase::Move => return self.pointer_move(event.position),
            PointerPhase::Up => self.pointer_up().map(|_| ()),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                debug!("Dropped {:?} event: {}", event.phase, err);
                false
            }
        }
    }

    // ---- header actions ----

    /// Returns whether anything changed
    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Clear => {
                // Discarding a half-drawn stroke also changes the scene
                let had_content = !self.model.drawing().is_empty() || self.model.is_active();
                self.clear();
                had_content && !self.is_exporting()
            }
            Command::CycleColor => {
                self.cycle_color();
                true
            }
            Command::CycleWidth => {
                self.cycle_width();
                true
            }
            Command::Undo => self.undo().is_some(),
        }
    }

    /// Affects only strokes that begin after this call
    pub fn cycle_color(&mut self) {
        let color = self.style.cycle_color();
        debug!("Color changed to {:?}", color);
        self.emit_style();
    }

    /// Affects only strokes that begin after this call
    pub fn cycle_width(&mut self) {
        let width = self.style.cycle_width();
        debug!("Width changed to {}", width);
        self.emit_style();
    }

    pub fn undo(&mut self) -> Option<StrokeRef> {
        if self.exporting.is_some() {
            warn!("Ignoring undo while an export is in progress");
            return None;
        }

        let removed = self.model.undo()?;
        self.events.emit(SketchEvent::StrokeUndone {
            stroke_id: removed.id(),
            remaining: self.model.drawing().len(),
        });
        Some(removed)
    }

    /// Empty the canvas, discarding any active stroke
    pub fn clear(&mut self) -> usize {
        if self.exporting.is_some() {
            warn!("Ignoring clear while an export is in progress");
            return 0;
        }
        self.clear_drawing()
    }

    // ---- rendering ----

    /// The composited scene at the current surface size
    pub fn scene(&mut self) -> Scene {
        self.renderer.render(&self.model, &self.background, self.surface)
    }

    // ---- export ----

    /// Snapshot and encode the drawing, entering the exporting phase.
    ///
    /// While exporting, new strokes, undo and clear are refused so the saved
    /// image always matches the drawing the user sees afterwards. Call
    /// [`Session::finish_export`] with the store's result to leave the phase.
    pub fn begin_export(&mut self, gate: &dyn PermissionGate) -> SketchResult<PendingExport> {
        if let Some(filename) = &self.exporting {
            warn!("Export of {} is already in progress", filename);
            return Err(SketchError::InvalidGestureState {
                operation: "export",
                state: "an export is in progress",
            });
        }
        if self.model.is_active() {
            return Err(SketchError::InvalidGestureState {
                operation: "export",
                state: self.model.state().name(),
            });
        }
        if self.model.drawing().is_empty() {
            debug!("Nothing to export");
            return Err(SketchError::EmptyDrawing);
        }
        if !gate.storage_granted() {
            return Err(self.export_failed(StorageError::PermissionDenied.into()));
        }

        let scene = self.scene();
        let bytes = capture::export(self.model.drawing(), &scene, &self.capture)
            .map_err(|err| self.export_failed(err))?;
        let filename = self.filenames.next(self.capture.format());

        info!("Exporting {} strokes as {}", self.model.drawing().len(), filename);
        self.exporting = Some(filename.clone());
        self.events.emit(SketchEvent::ExportStarted {
            filename: filename.clone(),
        });
        Ok(PendingExport { bytes, filename })
    }

    /// Complete the export with the store's result.
    ///
    /// The drawing is cleared only after a confirmed write, and only when
    /// configured to. On failure it is left untouched so the user can retry.
    pub fn finish_export(&mut self, stored: Result<PathBuf, StorageError>) -> SketchResult<SavedDrawing> {
        if self.exporting.take().is_none() {
            return Err(SketchError::InvalidGestureState {
                operation: "finish an export",
                state: "no export is in progress",
            });
        }

        let path = stored.map_err(|err| self.export_failed(err.into()))?;
        info!("Drawing saved to {}", path.display());
        self.events.emit(SketchEvent::ExportSucceeded { path: path.clone() });

        let cleared = self.clear_after_export;
        if cleared {
            self.clear_drawing();
        }
        Ok(SavedDrawing { path, cleared })
    }

    /// Export and persist in one call
    pub fn save(&mut self, store: &dyn ImageStore, gate: &dyn PermissionGate) -> SketchResult<SavedDrawing> {
        let pending = self.begin_export(gate)?;
        let stored = store.persist(&pending.bytes, &pending.filename);
        self.finish_export(stored)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_some()
    }

    // ---- accessors ----

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn model(&self) -> &StrokeModel {
        &self.model
    }

    pub fn drawing(&self) -> &Drawing {
        self.model.drawing()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    fn clear_drawing(&mut self) -> usize {
        let removed = self.model.clear();
        self.events.emit(SketchEvent::DrawingCleared { removed });
        removed
    }

    fn emit_style(&self) {
        let style = self.style.current();
        self.events.emit(SketchEvent::StyleChanged {
            color: style.color,
            width: style.width,
        });
    }

    fn export_failed(&self, err: SketchError) -> SketchError {
        error!("Export failed: {}", err);
        self.events.emit(SketchEvent::ExportFailed {
            message: err.to_string(),
        });
        err
    }
}
