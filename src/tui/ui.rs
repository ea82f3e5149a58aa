use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::core::state::App;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{INPUT_HEIGHT, LandingPage, MessageList, TitleBar};

fn screen_layout(area: Rect) -> [Rect; 3] {
    use Constraint::{Length, Min};
    Layout::vertical([Length(1), Min(0), Length(INPUT_HEIGHT)]).areas(area)
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    let [title_area, main_area, input_area] = screen_layout(frame.area());

    if app.items.is_empty() {
        LandingPage::new(app.meeting_id.as_deref()).render(frame, main_area);
    } else {
        MessageList::new(&mut tui.message_list, &app.items, spinner_frame).render(frame, main_area);
    }

    TitleBar {
        server: &app.server,
        meeting_id: app.meeting_id.as_deref(),
        status_message: app.status_text(),
        has_unseen_content: tui.message_list.has_unseen_content(),
    }
    .render(frame, title_area);

    tui.input_box.render(frame, input_area);
}

/// Maps a screen row to the transcript item drawn there.
pub fn hit_test_message(screen_y: u16, frame_area: Rect, tui: &TuiState) -> Option<usize> {
    let [_title_area, main_area, _input_area] = screen_layout(frame_area);

    if screen_y < main_area.y || screen_y >= main_area.y + main_area.height {
        return None;
    }
    tui.message_list.item_at(screen_y - main_area.y)
}
