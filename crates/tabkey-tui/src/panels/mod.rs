//! TUI panel implementations.

mod config;
mod decisions;
mod editor;

pub use config::ConfigPanel;
pub use decisions::DecisionsPanel;
pub use editor::EditorPanel;

/// Panels that scroll through read-only content.
pub trait PanelState {
    fn scroll_down(&mut self, n: usize);

    fn scroll_up(&mut self, n: usize);

    fn scroll_to_top(&mut self);

    fn scroll_to_bottom(&mut self);
}
