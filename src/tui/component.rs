use ratatui::Frame;
use ratatui::layout::Rect;

/// A reusable UI component.
///
/// Components receive their data as props (struct fields) and render to a
/// `Frame` within a given `Rect`. `render` takes `&mut self` so a component
/// may keep presentation state between frames.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}
