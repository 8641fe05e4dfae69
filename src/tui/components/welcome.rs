//! Welcome screen component.

use ratatui::{Frame, layout::Rect};

use super::{ACCENT_COLOR, DIM_COLOR, HEADING_COLOR, MUTED_COLOR, centered_line, render_hints};
use crate::build_info;
use crate::tui::app::LOGO_LINES;

const BLURB: &[&str] = &[
    "Turn a single word into one-of-a-kind line art,",
    "drawn bold and clean so it can be engraved.",
];

/// Minimum width to show the version footer.
const MIN_WIDTH_FOR_FOOTER: u16 = 50;

/// Render the welcome screen with logo, tagline and the two entry choices.
#[allow(clippy::cast_possible_truncation)]
pub fn render_welcome(frame: &mut Frame, area: Rect, tagline: &str, model: &str) {
    // Early return for tiny terminals
    if area.width < 10 || area.height < 5 {
        return;
    }

    let logo_height = LOGO_LINES.len() as u16;
    let total_height = logo_height + BLURB.len() as u16 + 7;
    let start_y = area.y + area.height.saturating_sub(total_height) / 2;

    for (i, line) in LOGO_LINES.iter().enumerate() {
        centered_line(frame, area, start_y + i as u16, line, ACCENT_COLOR);
    }

    let tagline_y = start_y + logo_height + 1;
    centered_line(frame, area, tagline_y, tagline, MUTED_COLOR);

    let blurb_y = tagline_y + 2;
    for (i, line) in BLURB.iter().enumerate() {
        centered_line(frame, area, blurb_y + i as u16, line, HEADING_COLOR);
    }

    let choices_y = blurb_y + BLURB.len() as u16 + 1;
    centered_line(
        frame,
        area,
        choices_y,
        "[t] Set a theme     [s] Surprise me",
        ACCENT_COLOR,
    );

    if !model.is_empty() {
        centered_line(frame, area, choices_y + 2, &format!("using {model}"), DIM_COLOR);
    }

    if area.width >= MIN_WIDTH_FOR_FOOTER && area.height > total_height + 2 {
        let footer = Rect::new(area.x, area.y, area.width, area.height.saturating_sub(1));
        render_hints(frame, footer, &[("t", "theme"), ("s", "surprise"), ("q", "quit")]);
        centered_line(
            frame,
            area,
            area.y + area.height - 1,
            &build_info::version_string(),
            DIM_COLOR,
        );
    }
}
