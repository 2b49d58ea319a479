use eframe::egui::{self, TextureHandle, TextureOptions};
use futures::channel::oneshot;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::background::{Background, Surface};
use crate::capture;
use crate::command::Command;
use crate::config::SketchConfig;
use crate::error::StorageError;
use crate::event::SketchEvent;
use crate::input::{CanvasArea, InputHandler};
use crate::session::Session;
use crate::storage::{FileStore, ImageStore};
use crate::style::StyleState;

// Longest edge of the saved-image preview, in pixels
const PREVIEW_EDGE: u32 = 320;

/// A write running on the save worker
struct SaveJob {
    receiver: oneshot::Receiver<Result<PathBuf, StorageError>>,
    bytes: Vec<u8>,
}

/// Confirmation shown after a successful save
struct SavedDialog {
    path: PathBuf,
    preview: Option<TextureHandle>,
}

/// Desktop shell around a [`Session`]: header buttons, the canvas and the
/// save dialogs.
pub struct SketchApp {
    config: SketchConfig,
    session: Session,
    input: InputHandler,
    store: FileStore,
    // Desktop platforms have no storage permission prompt
    storage_granted: bool,
    texture: Option<TextureHandle>,
    // Set by the session's event handler whenever the scene must be redrawn
    dirty: Arc<AtomicBool>,
    pending_save: Option<SaveJob>,
    saved: Option<SavedDialog>,
    save_error: Option<&'static str>,
}

impl SketchApp {
    /// Called once before the first frame.
    ///
    /// An explicit `config` wins over the one restored from app storage.
    pub fn new(cc: &eframe::CreationContext<'_>, config: Option<SketchConfig>) -> Self {
        let config = config
            .or_else(|| cc.storage.and_then(|storage| eframe::get_value(storage, eframe::APP_KEY)))
            .unwrap_or_default();

        let (config, session) = match Session::from_config(&config, Surface::new(0, 0)) {
            Ok(session) => (config, session),
            Err(err) => {
                log::error!("Invalid configuration, falling back to defaults: {}", err);
                let config = SketchConfig::default();
                let session = Session::new(
                    StyleState::default(),
                    Background::default(),
                    Surface::new(0, 0),
                    &config.export,
                );
                (config, session)
            }
        };

        let dirty = Arc::new(AtomicBool::new(true));
        let flag = dirty.clone();
        let ctx = cc.egui_ctx.clone();
        session.events().subscribe(move |event: &SketchEvent| {
            if event.changes_drawing() {
                flag.store(true, Ordering::Relaxed);
                ctx.request_repaint();
            }
        });

        Self {
            store: FileStore::new(config.export.output_dir.clone()),
            config,
            session,
            input: InputHandler::new(),
            storage_granted: true,
            texture: None,
            dirty,
            pending_save: None,
            saved: None,
            save_error: None,
        }
    }

    fn header(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            for command in Command::ALL {
                let button = match command {
                    Command::CycleColor => egui::Button::new(command.label()).fill(self.session.style().color()),
                    Command::CycleWidth => {
                        egui::Button::new(format!("{}={}", command.label(), self.session.style().width()))
                    }
                    _ => egui::Button::new(command.label()),
                };
                if ui.add_enabled(!self.session.is_exporting(), button).clicked() {
                    self.session.execute(command);
                }
            }

            let save = egui::Button::new(if self.session.is_exporting() { "Saving..." } else { "Save" });
            if ui.add_enabled(!self.session.is_exporting(), save).clicked() {
                self.start_save(ctx);
            }
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
        let rect = response.rect;
        let area = CanvasArea::new(rect, ctx.pixels_per_point());

        let surface = area.surface();
        if surface != self.session.surface() {
            self.session.resize(surface);
            self.dirty.store(true, Ordering::Relaxed);
        }

        for event in self.input.process_input(ctx, area) {
            self.session.handle_input(event);
        }

        if self.dirty.swap(false, Ordering::Relaxed) || self.texture.is_none() {
            let image = self.session.scene().to_color_image();
            if let Some(texture) = &mut self.texture {
                texture.set(image, TextureOptions::LINEAR);
            } else {
                self.texture = Some(ctx.load_texture("sketch_canvas", image, TextureOptions::LINEAR));
            }
        }

        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
        }
    }

    fn start_save(&mut self, ctx: &egui::Context) {
        match self.session.begin_export(&self.storage_granted) {
            Ok(pending) => {
                let (tx, receiver) = oneshot::channel();
                let store = self.store.clone();
                let worker_ctx = ctx.clone();
                let bytes = pending.bytes.clone();
                std::thread::spawn(move || {
                    let _ = tx.send(store.persist(&pending.bytes, &pending.filename));
                    worker_ctx.request_repaint();
                });
                self.pending_save = Some(SaveJob { receiver, bytes });
            }
            Err(err) if err.is_user_visible() => self.save_error = Some(err.user_message()),
            Err(err) => log::debug!("Save skipped: {}", err),
        }
    }

    fn poll_save(&mut self, ctx: &egui::Context) {
        let Some(job) = &mut self.pending_save else {
            return;
        };
        let stored = match job.receiver.try_recv() {
            Ok(Some(stored)) => stored,
            Ok(None) => return,
            Err(oneshot::Canceled) => Err(StorageError::Io(std::io::Error::other("save worker stopped"))),
        };
        let Some(job) = self.pending_save.take() else {
            return;
        };

        match self.session.finish_export(stored) {
            Ok(saved) => {
                let preview = match capture::preview(&job.bytes, PREVIEW_EDGE) {
                    Ok(image) => {
                        let size = [image.width() as usize, image.height() as usize];
                        let image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
                        Some(ctx.load_texture("saved_preview", image, TextureOptions::LINEAR))
                    }
                    Err(err) => {
                        log::warn!("No preview for {}: {}", saved.path.display(), err);
                        None
                    }
                };
                self.saved = Some(SavedDialog {
                    path: saved.path,
                    preview,
                });
            }
            Err(err) => self.save_error = Some(err.user_message()),
        }
    }

    fn dialogs(&mut self, ctx: &egui::Context) {
        if let Some(saved) = &self.saved {
            let mut open = true;
            egui::Window::new("Saved")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Saved to:");
                    ui.monospace(saved.path.display().to_string());
                    if let Some(texture) = &saved.preview {
                        ui.image((texture.id(), texture.size_vec2()));
                    }
                    if ui.button("Close").clicked() {
                        open = false;
                    }
                });
            // Dropping the dialog frees the preview texture
            if !open {
                self.saved = None;
            }
        }

        if let Some(message) = self.save_error {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message);
                    if ui.button("OK").clicked() {
                        self.save_error = None;
                    }
                });
        }
    }
}

impl eframe::App for SketchApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_save(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.header(ui, ctx));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui, ctx));

        self.dialogs(ctx);
    }
}
