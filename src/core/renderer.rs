/// Generic renderer trait for drawing a read-only view of game state
use ratatui::Frame;

pub trait Renderer<View: ?Sized> {
    /// Draw one frame. Must not mutate game state.
    fn render(&self, frame: &mut Frame, view: &View);
}
