use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChatLayout {
    pub header: Rect,
    pub history: Rect,
    pub status: Rect,
    pub input: Rect,
}

/// Header, scrolling history, one status row, and the prompt at the bottom.
///
/// The prompt never takes more than half the screen.
pub fn split_chat_layout(area: Rect, input_rows: u16) -> ChatLayout {
    let input_rows = input_rows.clamp(1, (area.height / 2).max(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(input_rows),
        ])
        .split(area);

    ChatLayout {
        header: chunks[0],
        history: chunks[1],
        status: chunks[2],
        input: chunks[3],
    }
}
