use std::path::PathBuf;

use egui::Color32;

/// Notifications emitted after every change to the session.
///
/// Stroke events and `DrawingCleared` mean the scene must be redrawn. Style
/// and export events leave the drawn content as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchEvent {
    StrokeStarted {
        stroke_id: u64,
    },
    StrokeExtended {
        stroke_id: u64,
        points: usize,
    },
    StrokeFinished {
        stroke_id: u64,
        points: usize,
    },
    StrokeUndone {
        stroke_id: u64,
        remaining: usize,
    },
    DrawingCleared {
        removed: usize,
    },
    StyleChanged {
        color: Color32,
        width: f32,
    },
    ExportStarted {
        filename: String,
    },
    ExportSucceeded {
        path: PathBuf,
    },
    ExportFailed {
        message: String,
    },
}

impl SketchEvent {
    /// Whether the drawn content may have changed
    pub fn changes_drawing(&self) -> bool {
        matches!(
            self,
            Self::StrokeStarted { .. }
                | Self::StrokeExtended { .. }
                | Self::StrokeFinished { .. }
                | Self::StrokeUndone { .. }
                | Self::DrawingCleared { .. }
        )
    }
}
