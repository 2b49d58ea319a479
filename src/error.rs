use thiserror::Error;

/// Errors produced by the drawing session
#[derive(Debug, Error)]
pub enum SketchError {
    /// Operation attempted in the wrong gesture state. Nothing was changed.
    #[error("Cannot {operation} while {state}")]
    InvalidGestureState {
        operation: &'static str,
        state: &'static str,
    },

    /// Export was requested with no strokes on the canvas
    #[error("Nothing to export: the drawing is empty")]
    EmptyDrawing,

    /// The surface could not produce a frame
    #[error("Failed to capture the drawing: {0}")]
    CaptureFailure(String),

    #[error("Failed to store the drawing: {0}")]
    PersistenceFailure(#[from] StorageError),
}

impl SketchError {
    /// Whether this error should be shown to the user.
    ///
    /// Gesture and empty-drawing errors are guarded by the caller and only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::CaptureFailure(_) | Self::PersistenceFailure(_))
    }

    /// The single notification text for any failed save
    pub fn user_message(&self) -> &'static str {
        "Could not save the drawing."
    }
}

/// Errors reported by an image store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage access was not granted")]
    PermissionDenied,

    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file name: {0}")]
    InvalidFilename(String),
}

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("Color palette must contain at least one color")]
    EmptyPalette,

    #[error("Width set must contain at least one width")]
    EmptyWidths,

    #[error("Stroke width must be positive and finite, got {0}")]
    InvalidWidth(f32),

    #[error("Export quality must be within 0..=1, got {0}")]
    InvalidQuality(f32),

    #[error("Background opacity must be within 0..=1, got {0}")]
    InvalidOpacity(f32),

    #[error("Failed to load background image: {0}")]
    Background(#[from] image::ImageError),
}

pub type SketchResult<T> = Result<T, SketchError>;
