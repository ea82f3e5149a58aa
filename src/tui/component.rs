use ratatui::Frame;
use ratatui::layout::Rect;

/// A piece of the chat screen that can draw itself.
///
/// Components receive what they show as struct fields ("props") and may keep
/// presentation state of their own, such as a scroll offset or a layout cache,
/// which is why `render` takes `&mut self`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that reacts to terminal input.
pub trait EventHandler {
    /// The higher-level event this component reports to the event loop.
    type Event;

    /// Consume a `TuiEvent`, possibly emitting a component event.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
