mod bus;
mod events;

pub use bus::EventBus;
pub use events::SketchEvent;

/// Receives drawing notifications
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &SketchEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&SketchEvent) + Send,
{
    fn handle_event(&mut self, event: &SketchEvent) {
        (*self)(event)
    }
}
