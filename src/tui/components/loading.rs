use ratatui::{Frame, layout::Rect};

use super::{ACCENT_COLOR, HEADING_COLOR, MUTED_COLOR, centered_line};

pub fn render_loading(frame: &mut Frame, area: Rect, spinner: &str, theme: &str) {
    if area.height < 3 {
        return;
    }

    let y = area.y + area.height.saturating_sub(4) / 2;
    centered_line(frame, area, y, spinner, ACCENT_COLOR);

    let heading = if theme.trim().is_empty() {
        "Creating your designs...".to_string()
    } else {
        format!("Creating your {} designs...", theme.trim())
    };
    centered_line(frame, area, y + 2, &heading, HEADING_COLOR);
    centered_line(frame, area, y + 3, "This will take a few seconds", MUTED_COLOR);
}
