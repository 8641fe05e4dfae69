//! Theme entry screen.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{
    ACCENT_COLOR, DIM_COLOR, ERROR_COLOR, HEADING_COLOR, MUTED_COLOR, centered_line,
    render_hints,
};
use crate::core::prompt::MAX_THEME_CHARS;

const INPUT_WIDTH: u16 = 32;
const PLACEHOLDER: &str = "ocean";

/// Render the theme entry screen.
///
/// Returns the cursor position inside the input box.
#[allow(clippy::cast_possible_truncation)]
pub fn render_theme(frame: &mut Frame, area: Rect, theme: &str, error: Option<&str>) -> (u16, u16) {
    if area.width < 10 || area.height < 8 {
        return (area.x, area.y);
    }

    let start_y = area.y + area.height.saturating_sub(10) / 2;
    centered_line(frame, area, start_y, "Choose Your Theme", HEADING_COLOR);
    centered_line(
        frame,
        area,
        start_y + 1,
        "Enter a single word like 'ocean', 'vintage', or 'geometric'",
        MUTED_COLOR,
    );

    let width = INPUT_WIDTH.min(area.width);
    let input_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        start_y + 3,
        width,
        3,
    );

    let count = theme.chars().count();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT_COLOR))
        .title_bottom(
            Line::from(Span::styled(
                format!(" {count}/{MAX_THEME_CHARS} "),
                Style::default().fg(DIM_COLOR),
            ))
            .right_aligned(),
        );

    let content = if theme.is_empty() {
        Span::styled(PLACEHOLDER, Style::default().fg(DIM_COLOR))
    } else {
        Span::styled(theme.to_string(), Style::default().fg(Color::White))
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), input_area);

    if let Some(error) = error {
        centered_line(frame, area, input_area.y + 4, error, ERROR_COLOR);
    }

    render_hints(frame, area, &[("enter", "generate"), ("esc", "back")]);

    let cursor_x = (input_area.x + 1 + count as u16).min(input_area.x + input_area.width - 2);
    (cursor_x, input_area.y + 1)
}
