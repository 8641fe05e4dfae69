//! TUI components for rendering each page of the flow.

mod loading;
mod results;
mod theme;
mod welcome;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

pub use loading::render_loading;
pub use results::render_results;
pub use theme::render_theme;
pub use welcome::render_welcome;

/// Brand colors
pub const ACCENT_COLOR: Color = Color::Rgb(77, 201, 176);
pub const HEADING_COLOR: Color = Color::Rgb(230, 230, 235);
pub const MUTED_COLOR: Color = Color::Rgb(140, 140, 150);
pub const DIM_COLOR: Color = Color::Rgb(100, 100, 110);
pub const ERROR_COLOR: Color = Color::Rgb(220, 90, 90);
pub const NOTICE_COLOR: Color = Color::Rgb(180, 160, 100);

/// Render a single centered line at row `y`, clipped to `area`.
pub fn centered_line(frame: &mut Frame, area: Rect, y: u16, text: &str, color: Color) {
    if y >= area.y + area.height {
        return;
    }
    let line = Line::from(Span::styled(text.to_string(), Style::default().fg(color)));
    let para = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(para, Rect::new(area.x, y, area.width, 1));
}

/// Key hints line like `enter generate · esc back`.
pub fn hint_line(hints: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, label)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", Style::default().fg(DIM_COLOR)));
        }
        spans.push(Span::styled((*key).to_string(), Style::default().fg(ACCENT_COLOR)));
        spans.push(Span::styled(format!(" {label}"), Style::default().fg(MUTED_COLOR)));
    }
    Line::from(spans)
}

/// Render key hints on the last row of `area`.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[(&str, &str)]) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height - 1;
    let para = Paragraph::new(hint_line(hints)).alignment(Alignment::Center);
    frame.render_widget(para, Rect::new(area.x, y, area.width, 1));
}
