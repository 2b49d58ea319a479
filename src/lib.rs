#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod capture;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod input;
pub mod model;
pub mod renderer;
pub mod session;
pub mod state;
pub mod storage;
pub mod stroke;
pub mod style;
pub mod util;

mod id_generator;

pub use app::SketchApp;
pub use background::{Background, Surface};
pub use capture::{Capture, export, preview};
pub use command::Command;
pub use config::{ExportConfig, ExportFormat, SketchConfig};
pub use document::Drawing;
pub use error::{ConfigError, SketchError, SketchResult, StorageError};
pub use event::{EventBus, EventHandler, SketchEvent};
pub use input::{CanvasArea, InputEvent, InputHandler, PointerPhase};
pub use model::StrokeModel;
pub use renderer::{Renderer, Scene, render, render_drawing};
pub use session::{PendingExport, SavedDrawing, Session};
pub use state::GestureState;
pub use storage::{FileStore, FilenameGenerator, ImageStore, PermissionGate};
pub use stroke::{Point, Stroke, StrokeRef, StrokeStyle, StrokeView};
pub use style::{Palette, StyleState, WidthSet};
