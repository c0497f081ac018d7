use crate::ui::measure::{display_width, prompt_cursor, truncate_to_width, wrap_prompt};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

const PROMPT_PREFIX: &str = "> ";
const PROMPT_PLACEHOLDER: &str = "Ask about hours, policies, capacity or locations (/help)";

pub fn input_visual_rows(input: &str, width: usize) -> usize {
    wrap_prompt(input, width.saturating_sub(PROMPT_PREFIX.len())).len()
}

/// Rows `lines` occupy once wrapped at `width` columns.
pub fn visual_rows(lines: &[Line<'_>], width: usize) -> usize {
    let width = width.max(1);
    lines
        .iter()
        .map(|line| {
            let used: usize = line
                .spans
                .iter()
                .map(|span| display_width(&span.content))
                .sum();
            used.div_ceil(width).max(1)
        })
        .sum()
}

pub fn render_header(frame: &mut Frame<'_>, area: Rect, title: &str, turns: usize) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let line = Line::from(vec![
        Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {turns} messages  Tab expand  PgUp/PgDn scroll  Esc quit"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draws history pinned to the bottom, `scroll_back` rows up from the end.
pub fn render_history(
    frame: &mut Frame<'_>,
    area: Rect,
    lines: Vec<Line<'static>>,
    scroll_back: usize,
) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let total = visual_rows(&lines, area.width as usize);
    let top = total
        .saturating_sub(area.height as usize)
        .saturating_sub(scroll_back);
    let top = u16::try_from(top).unwrap_or(u16::MAX);

    frame.render_widget(
        Paragraph::new(lines)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false })
            .scroll((top, 0)),
        area,
    );
}

pub fn render_status_line(frame: &mut Frame<'_>, area: Rect, status: Option<&str>, busy: bool) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let text = match (status, busy) {
        (Some(status), _) => format!("⋯ {status}"),
        (None, true) => "⋯".to_string(),
        (None, false) => String::new(),
    };
    frame.render_widget(
        Paragraph::new(truncate_to_width(&text, area.width as usize))
            .style(Style::default().fg(Color::Yellow)),
        area,
    );
}

pub fn render_input(frame: &mut Frame<'_>, area: Rect, input: &str, cursor: usize, busy: bool) {
    if area.height == 0 || area.width <= 2 {
        return;
    }

    let style = Style::default().fg(Color::Gray).bg(Color::Rgb(24, 24, 24));
    if input.is_empty() {
        let hint = if busy {
            "waiting for the agent..."
        } else {
            PROMPT_PLACEHOLDER
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(PROMPT_PREFIX),
                Span::styled(hint, Style::default().add_modifier(Modifier::DIM)),
            ]))
            .style(style),
            area,
        );
        frame.set_cursor_position((area.x + PROMPT_PREFIX.len() as u16, area.y));
        return;
    }

    let width = (area.width as usize).saturating_sub(PROMPT_PREFIX.len()).max(1);
    let lines = wrap_prompt(input, width);
    let (cursor_row, cursor_col) = prompt_cursor(input, cursor, width);
    let visible = area.height as usize;
    let first = (cursor_row + 1).saturating_sub(visible);

    let rendered: Vec<Line<'static>> = lines
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(row, line)| {
            let prefix = if row == 0 { PROMPT_PREFIX } else { "  " };
            Line::from(format!("{prefix}{line}"))
        })
        .collect();
    frame.render_widget(Paragraph::new(rendered).style(style), area);

    let x = area.x + (PROMPT_PREFIX.len() + cursor_col) as u16;
    let y = area.y + (cursor_row - first) as u16;
    frame.set_cursor_position((x.min(area.right().saturating_sub(1)), y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_rows_counts_wrapped_lines() {
        let lines = vec![
            Line::from("abcdefgh"),
            Line::from(""),
            Line::from(vec![Span::raw("ab"), Span::raw("cd")]),
        ];
        assert_eq!(visual_rows(&lines, 4), 2 + 1 + 1);
        assert_eq!(visual_rows(&lines, 3), 3 + 1 + 2);
    }

    #[test]
    fn test_input_rows_reserve_prefix() {
        assert_eq!(input_visual_rows("", 10), 1);
        assert_eq!(input_visual_rows("abcdefghij", 10), 2);
    }
}
