use egui::{Context, LayerId, Order, PointerButton, Pos2, Rect};

use crate::background::Surface;
use crate::stroke::Point;

/// Phase of a pointer gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event in surface pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub phase: PointerPhase,
    pub position: Point,
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            position: Point::new(x, y),
        }
    }
}

/// Where the canvas sits on screen.
///
/// `rect` is in egui points. The surface behind it is `rect` scaled to
/// physical pixels, so strokes and exports match the display resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasArea {
    pub rect: Rect,
    pub pixels_per_point: f32,
}

impl CanvasArea {
    pub fn new(rect: Rect, pixels_per_point: f32) -> Self {
        Self { rect, pixels_per_point }
    }

    /// Pixel dimensions of the drawing surface
    pub fn surface(&self) -> Surface {
        let size = self.rect.size() * self.pixels_per_point;
        Surface::new(size.x.round().max(0.0) as u32, size.y.round().max(0.0) as u32)
    }

    /// Screen position to surface pixels
    pub fn to_surface(&self, pos: Pos2) -> Point {
        let local = (pos - self.rect.min) * self.pixels_per_point;
        Point::new(f64::from(local.x), f64::from(local.y))
    }
}

/// Converts raw egui events into the canvas' pointer stream.
///
/// Presses start a gesture only inside the canvas and only when no window is
/// on top of it. Moves are forwarded while the primary button is held, and a
/// release anywhere (or the pointer leaving the window) ends the gesture.
#[derive(Debug, Default)]
pub struct InputHandler {
    pressed: bool,
    last_pointer_pos: Option<Pos2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain this frame's pointer events, in delivery order
    pub fn process_input(&mut self, ctx: &Context, canvas: CanvasArea) -> Vec<InputEvent> {
        let events = ctx.input(|input| input.raw.events.clone());
        let covered = |pos: Pos2| {
            ctx.layer_id_at(pos)
                .is_some_and(|layer: LayerId| layer.order != Order::Background)
        };
        events
            .iter()
            .filter_map(|event| self.translate(event, canvas, covered))
            .collect()
    }

    /// Translate a single raw event.
    ///
    /// `covered` reports whether another layer (a window or popup) sits above
    /// the canvas at a position; presses there belong to that layer.
    pub fn translate(
        &mut self,
        event: &egui::Event,
        canvas: CanvasArea,
        covered: impl Fn(Pos2) -> bool,
    ) -> Option<InputEvent> {
        match event {
            egui::Event::PointerButton {
                pos,
                button: PointerButton::Primary,
                pressed,
                ..
            } => {
                self.last_pointer_pos = Some(*pos);
                if *pressed {
                    if !canvas.rect.contains(*pos) || covered(*pos) {
                        return None;
                    }
                    self.pressed = true;
                    Some(InputEvent {
                        phase: PointerPhase::Down,
                        position: canvas.to_surface(*pos),
                    })
                } else if std::mem::take(&mut self.pressed) {
                    Some(InputEvent {
                        phase: PointerPhase::Up,
                        position: canvas.to_surface(*pos),
                    })
                } else {
                    None
                }
            }
            egui::Event::PointerMoved(pos) => {
                self.last_pointer_pos = Some(*pos);
                self.pressed.then(|| InputEvent {
                    phase: PointerPhase::Move,
                    position: canvas.to_surface(*pos),
                })
            }
            egui::Event::PointerGone => {
                let last = self.last_pointer_pos.take()?;
                std::mem::take(&mut self.pressed).then(|| InputEvent {
                    phase: PointerPhase::Up,
                    position: canvas.to_surface(last),
                })
            }
            _ => None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, RawInput, pos2, vec2};

    fn canvas() -> CanvasArea {
        CanvasArea::new(Rect::from_min_max(pos2(100.0, 50.0), pos2(300.0, 250.0)), 1.0)
    }

    fn uncovered(_: Pos2) -> bool {
        false
    }

    fn button(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn test_gesture_is_translated_to_local_coordinates() {
        let mut handler = InputHandler::new();
        let events: Vec<_> = [
            button(110.0, 60.0, true),
            egui::Event::PointerMoved(pos2(120.0, 70.0)),
            button(130.0, 60.0, false),
        ]
        .iter()
        .filter_map(|event| handler.translate(event, canvas(), uncovered))
        .collect();

        assert_eq!(
            events,
            vec![
                InputEvent::down(10.0, 10.0),
                InputEvent::moved(20.0, 20.0),
                InputEvent::up(30.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let mut handler = InputHandler::new();
        assert!(handler.translate(&button(10.0, 10.0, true), canvas(), uncovered).is_none());
        assert!(
            handler
                .translate(&egui::Event::PointerMoved(pos2(150.0, 100.0)), canvas(), uncovered)
                .is_none()
        );
        assert!(handler.translate(&button(150.0, 100.0, false), canvas(), uncovered).is_none());
    }

    #[test]
    fn test_press_on_covering_window_is_ignored() {
        let mut handler = InputHandler::new();
        let dialog = Rect::from_min_size(pos2(120.0, 80.0), vec2(100.0, 60.0));
        let covered = |pos: Pos2| dialog.contains(pos);

        // Clicking and dragging the dialog never reaches the canvas
        assert!(handler.translate(&button(130.0, 90.0, true), canvas(), covered).is_none());
        assert!(
            handler
                .translate(&egui::Event::PointerMoved(pos2(160.0, 200.0)), canvas(), covered)
                .is_none()
        );
        assert!(handler.translate(&button(160.0, 200.0, false), canvas(), covered).is_none());
        assert!(!handler.is_pressed());

        // Beside the dialog the canvas still draws
        let down = handler.translate(&button(110.0, 200.0, true), canvas(), covered);
        assert_eq!(down, Some(InputEvent::down(10.0, 150.0)));
    }

    #[test]
    fn test_dialog_window_blocks_canvas_press() {
        let ctx = egui::Context::default();
        let screen = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 640.0));
        let canvas = CanvasArea::new(Rect::from_min_max(pos2(0.0, 40.0), pos2(800.0, 640.0)), 1.0);
        let show_dialog = |ctx: &Context| {
            egui::Window::new("Saved")
                .fixed_pos(pos2(100.0, 100.0))
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Saved to:");
                    ui.label("drawings/drawing_1.jpg");
                });
        };

        let frame = |events: Vec<egui::Event>| RawInput {
            screen_rect: Some(screen),
            events,
            ..Default::default()
        };
        let _ = ctx.run(frame(Vec::new()), |ctx| show_dialog(ctx));

        let mut handler = InputHandler::new();
        let mut translated = Vec::new();
        let click = vec![
            egui::Event::PointerMoved(pos2(120.0, 130.0)),
            button(120.0, 130.0, true),
            button(120.0, 130.0, false),
        ];
        let _ = ctx.run(frame(click), |ctx| {
            show_dialog(ctx);
            translated.extend(handler.process_input(ctx, canvas));
        });
        assert!(translated.is_empty(), "dialog click reached the canvas: {:?}", translated);

        // The same click away from the dialog draws
        translated.clear();
        let click = vec![
            egui::Event::PointerMoved(pos2(600.0, 500.0)),
            button(600.0, 500.0, true),
            button(600.0, 500.0, false),
        ];
        let _ = ctx.run(frame(click), |ctx| {
            show_dialog(ctx);
            translated.extend(handler.process_input(ctx, canvas));
        });
        assert_eq!(translated, vec![InputEvent::down(600.0, 460.0), InputEvent::up(600.0, 460.0)]);
    }

    #[test]
    fn test_positions_scale_to_physical_pixels() {
        let canvas = CanvasArea::new(Rect::from_min_size(pos2(0.0, 40.0), vec2(900.0, 600.0)), 2.0);
        assert_eq!(canvas.surface(), Surface::new(1800, 1200));

        let mut handler = InputHandler::new();
        let down = handler.translate(&button(10.0, 45.5, true), canvas, uncovered);
        assert_eq!(down, Some(InputEvent::down(20.0, 11.0)));
    }

    #[test]
    fn test_pointer_leaving_window_ends_gesture() {
        let mut handler = InputHandler::new();
        handler.translate(&button(150.0, 100.0, true), canvas(), uncovered);
        handler.translate(&egui::Event::PointerMoved(pos2(160.0, 110.0)), canvas(), uncovered);

        let event = handler.translate(&egui::Event::PointerGone, canvas(), uncovered).unwrap();
        assert_eq!(event, InputEvent::up(60.0, 60.0));
        assert!(!handler.is_pressed());
    }
}
