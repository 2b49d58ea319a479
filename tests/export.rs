use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use egui::Color32;
use sketchpad::{
    Background, Command, ExportConfig, ExportFormat, ImageStore, InputEvent, Point, Session,
    SketchConfig, SketchError, SketchEvent, StorageError, StyleState, Surface,
};

/// Records every write; fails them all when `fail` is set
#[derive(Default)]
struct RecordingStore {
    writes: RefCell<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl ImageStore for RecordingStore {
    fn persist(&self, bytes: &[u8], suggested_filename: &str) -> Result<PathBuf, StorageError> {
        if self.fail {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.writes
            .borrow_mut()
            .push((suggested_filename.to_owned(), bytes.to_vec()));
        Ok(PathBuf::from("/pictures").join(suggested_filename))
    }
}

fn session(clear_after_export: bool) -> Session {
    let export = ExportConfig {
        clear_after_export,
        ..ExportConfig::default()
    };
    Session::new(StyleState::default(), Background::default(), Surface::new(64, 48), &export)
}

fn draw_scenario(session: &mut Session) {
    for event in [
        InputEvent::down(10.0, 10.0),
        InputEvent::moved(20.0, 20.0),
        InputEvent::moved(30.0, 10.0),
        InputEvent::up(30.0, 10.0),
    ] {
        assert!(session.handle_input(event));
    }
}

#[test]
fn test_export_after_gesture_produces_bytes() {
    let mut session = session(false);
    draw_scenario(&mut session);

    assert_eq!(session.drawing().len(), 1);
    assert_eq!(
        session.drawing().strokes()[0].points(),
        &[Point::new(10.0, 10.0), Point::new(20.0, 20.0), Point::new(30.0, 10.0)]
    );

    let store = RecordingStore::default();
    let saved = session.save(&store, &true).unwrap();

    let writes = store.writes.borrow();
    assert_eq!(writes.len(), 1);
    let (filename, bytes) = &writes[0];
    assert!(!bytes.is_empty());
    assert!(filename.starts_with("drawing_") && filename.ends_with(".jpg"));
    assert_eq!(saved.path, PathBuf::from("/pictures").join(filename));
    assert!(!saved.cleared);
    assert_eq!(session.drawing().len(), 1);
}

#[test]
fn test_empty_drawing_never_reaches_the_store() {
    let mut session = session(true);
    let store = RecordingStore::default();

    let result = session.save(&store, &true);
    assert!(matches!(result, Err(SketchError::EmptyDrawing)));
    assert!(store.writes.borrow().is_empty());
    assert!(!session.is_exporting());
}

#[test]
fn test_clear_happens_only_after_successful_save() {
    let mut session = session(true);
    draw_scenario(&mut session);

    let failing = RecordingStore {
        fail: true,
        ..Default::default()
    };
    let err = session.save(&failing, &true).unwrap_err();
    assert!(matches!(err, SketchError::PersistenceFailure(_)));
    assert!(err.is_user_visible());
    assert_eq!(session.drawing().len(), 1, "failed save must keep strokes");

    // Retry succeeds and then clears
    let store = RecordingStore::default();
    let saved = session.save(&store, &true).unwrap();
    assert!(saved.cleared);
    assert!(session.drawing().is_empty());
}

#[test]
fn test_denied_permission_fails_without_persisting() {
    let mut session = session(true);
    draw_scenario(&mut session);
    let store = RecordingStore::default();

    let err = session.save(&store, &false).unwrap_err();
    assert!(matches!(
        err,
        SketchError::PersistenceFailure(StorageError::PermissionDenied)
    ));
    assert!(store.writes.borrow().is_empty());
    assert_eq!(session.drawing().len(), 1);
}

#[test]
fn test_unlaid_surface_is_capture_failure() {
    let mut session = Session::new(
        StyleState::default(),
        Background::default(),
        Surface::new(0, 0),
        &ExportConfig::default(),
    );
    draw_scenario(&mut session);

    let store = RecordingStore::default();
    let err = session.save(&store, &true).unwrap_err();
    assert!(matches!(err, SketchError::CaptureFailure(_)));
    assert!(store.writes.borrow().is_empty());
    assert_eq!(session.drawing().len(), 1);
}

#[test]
fn test_gestures_are_refused_while_exporting() {
    let mut session = session(true);
    draw_scenario(&mut session);

    let pending = session.begin_export(&true).unwrap();
    assert!(session.is_exporting());

    assert!(!session.handle_input(InputEvent::down(5.0, 5.0)));
    assert!(session.undo().is_none());
    assert_eq!(session.clear(), 0);
    assert!(matches!(
        session.begin_export(&true),
        Err(SketchError::InvalidGestureState { .. })
    ));
    assert_eq!(session.drawing().len(), 1);

    let saved = session
        .finish_export(Ok(PathBuf::from("/pictures").join(&pending.filename)))
        .unwrap();
    assert!(saved.cleared);
    assert!(!session.is_exporting());
    assert!(session.handle_input(InputEvent::down(5.0, 5.0)));
}

#[test]
fn test_export_refused_mid_gesture() {
    let mut session = session(false);
    session.handle_input(InputEvent::down(1.0, 1.0));

    let result = session.begin_export(&true);
    assert!(matches!(result, Err(SketchError::InvalidGestureState { .. })));
    assert!(!session.is_exporting());
}

#[test]
fn test_png_export_uses_png_extension() {
    let config = SketchConfig {
        export: ExportConfig {
            format: ExportFormat::Png,
            filename_prefix: "picture_".to_owned(),
            ..ExportConfig::default()
        },
        ..SketchConfig::default()
    };
    let mut session = Session::from_config(&config, Surface::new(32, 32)).unwrap();
    draw_scenario(&mut session);

    let pending = session.begin_export(&true).unwrap();
    assert!(pending.filename.starts_with("picture_") && pending.filename.ends_with(".png"));
    assert_eq!(&pending.bytes[..4], b"\x89PNG");

    let decoded = image::load_from_memory(&pending.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 32));
}

#[test]
fn test_consecutive_saves_get_distinct_names() {
    let mut session = session(false);
    draw_scenario(&mut session);
    let store = RecordingStore::default();

    let first = session.save(&store, &true).unwrap();
    let second = session.save(&store, &true).unwrap();
    assert_ne!(first.path, second.path);
}

#[test]
fn test_session_events_announce_changes() {
    let mut session = session(true);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session
        .events()
        .subscribe(move |event: &SketchEvent| sink.lock().unwrap().push(event.clone()));

    draw_scenario(&mut session);
    session.execute(Command::CycleColor);
    session.execute(Command::Undo);
    session.save(&RecordingStore::default(), &true).unwrap_err();

    let seen = seen.lock().unwrap();
    assert!(matches!(seen[0], SketchEvent::StrokeStarted { .. }));
    assert!(matches!(seen[1], SketchEvent::StrokeExtended { points: 2, .. }));
    assert!(matches!(seen[2], SketchEvent::StrokeExtended { points: 3, .. }));
    assert!(matches!(seen[3], SketchEvent::StrokeFinished { points: 3, .. }));
    assert!(matches!(
        seen[4],
        SketchEvent::StyleChanged { color, width } if color == Color32::from_rgb(0xfc, 0x03, 0x03) && width == 1.0
    ));
    assert!(matches!(seen[5], SketchEvent::StrokeUndone { remaining: 0, .. }));
    // The empty-drawing save is ignored silently
    assert_eq!(seen.len(), 6);
}

#[test]
fn test_style_commands_affect_only_new_strokes() {
    let mut session = session(false);
    draw_scenario(&mut session);
    session.execute(Command::CycleColor);
    session.execute(Command::CycleWidth);
    draw_scenario(&mut session);

    let strokes = session.drawing().strokes();
    assert_eq!(strokes[0].color(), Color32::BLACK);
    assert_eq!(strokes[0].width(), 1.0);
    assert_eq!(strokes[1].color(), Color32::from_rgb(0xfc, 0x03, 0x03));
    assert_eq!(strokes[1].width(), 3.0);
}

#[test]
fn test_stray_events_are_ignored() {
    let mut session = session(false);
    assert!(!session.handle_input(InputEvent::moved(1.0, 1.0)));
    assert!(!session.handle_input(InputEvent::up(1.0, 1.0)));
    assert!(session.drawing().is_empty());

    session.handle_input(InputEvent::down(1.0, 1.0));
    assert!(!session.handle_input(InputEvent::down(2.0, 2.0)));
    session.handle_input(InputEvent::up(1.0, 1.0));
    assert_eq!(session.drawing().len(), 1);
    assert_eq!(session.drawing().strokes()[0].points().len(), 1);
}

#[test]
fn test_clear_reports_discarded_active_stroke() {
    let mut session = session(false);
    session.handle_input(InputEvent::down(4.0, 4.0));
    session.handle_input(InputEvent::moved(8.0, 8.0));

    assert!(session.execute(Command::Clear));
    assert!(!session.model().is_active());
    assert!(!session.execute(Command::Clear), "nothing left to clear");
}
