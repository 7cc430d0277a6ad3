use ratatui::Frame;

use crate::ui::history::render_history;
use crate::{App, AppState};

/// One full-frame view. The app state decides which screen draws each
/// frame; screens are stateless, all mutable state lives on the App.
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// The question-and-answer screen and the end-of-round summary both
/// render through the App widget, which branches on the game phase.
struct GameScreen;

impl Screen for GameScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Per-question progress table, drawn by its own renderer because it
/// needs mutable access to clamp the scroll offset.
struct HistoryScreen;

impl Screen for HistoryScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_history(app, f);
    }
}

pub fn current_screen(state: &AppState) -> &'static dyn Screen {
    match state {
        AppState::Playing | AppState::Results => &GameScreen,
        AppState::History => &HistoryScreen,
    }
}
