#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use std::path::PathBuf;

use sketchpad::{SketchApp, SketchConfig};

fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    // Optional first argument: path to a JSON config file
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match SketchConfig::from_json_file(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                log::error!("Ignoring config {}: {}", path.display(), err);
                None
            }
        },
        None => None,
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 720.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Sketchpad",
        native_options,
        Box::new(|cc| Ok(Box::new(SketchApp::new(cc, config)))),
    )
}
