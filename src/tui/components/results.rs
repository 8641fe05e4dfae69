//! Results screen listing each generated design.

use std::path::Path;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::{
    ACCENT_COLOR, DIM_COLOR, ERROR_COLOR, HEADING_COLOR, MUTED_COLOR, NOTICE_COLOR, render_hints,
};
use crate::core::Design;

const NOTE: &str = "Make sure you download the image you love, as it is totally unique and will never be made again.";

/// Render the results screen.
pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    designs: &[Design],
    notice: Option<&str>,
    error: Option<&str>,
    download_dir: &Path,
) {
    if area.width < 10 || area.height < 5 {
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            "Made for You",
            Style::default()
                .fg(HEADING_COLOR)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(NOTE, Style::default().fg(MUTED_COLOR))),
        Line::default(),
    ];

    for (i, design) in designs.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", i + 1), Style::default().fg(ACCENT_COLOR)),
            Span::styled(
                design.name.clone(),
                Style::default()
                    .fg(HEADING_COLOR)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", design.image_url),
            Style::default().fg(DIM_COLOR),
        )));
        lines.push(Line::from(Span::styled(
            format!("    {}", design.description),
            Style::default().fg(MUTED_COLOR),
        )));
        lines.push(Line::default());
    }

    lines.push(Line::from(Span::styled(
        format!("Downloads go to {}", download_dir.display()),
        Style::default().fg(DIM_COLOR),
    )));

    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(NOTICE_COLOR),
        )));
    }
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(ERROR_COLOR),
        )));
    }

    let body = Rect::new(
        area.x + 2,
        area.y + 1,
        area.width.saturating_sub(4),
        area.height.saturating_sub(2),
    );
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);

    let last = designs.len().max(1);
    let keys = format!("1-{last}");
    render_hints(
        frame,
        area,
        &[(&keys, "download"), ("r", "start new design"), ("q", "quit")],
    );
}
