//! Terminal user interface for Engraver.

mod app;
mod components;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Position};

use crate::config::Config;
use crate::core::{Action, Page, source_from_config};

pub use app::App;
use components::{render_loading, render_results, render_theme, render_welcome};

/// Spinner frame interval.
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Run the TUI application.
///
/// # Errors
///
/// Returns an error if terminal initialization fails or the event loop encounters an error.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let source = source_from_config(&config);
    let mut app = App::new(source, &config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    let mut spinner = tokio::time::interval(SPINNER_INTERVAL);

    loop {
        app.poll_tasks();
        terminal.draw(|f| render(f, app))?;

        tokio::select! {
            () = tokio::time::sleep(Duration::from_millis(10)) => {
                while event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Accept Press and Repeat, but not Release
                        if key.kind != KeyEventKind::Release
                            && handle_key(app, key.code, key.modifiers)
                        {
                            return Ok(());
                        }
                    }
                }
            }
            _ = spinner.tick() => {
                if app.flow.page == Page::Loading {
                    app.tick();
                }
            }
        }
    }
}

fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let flow = &app.flow;

    match flow.page {
        Page::Welcome => render_welcome(frame, area, app.tagline, &app.model),
        Page::Theme => {
            let (x, y) = render_theme(frame, area, &flow.theme, flow.error.as_deref());
            frame.set_cursor_position(Position::new(x, y));
        }
        Page::Loading => render_loading(frame, area, app.spinner_frame(), &flow.theme),
        Page::Results => render_results(
            frame,
            area,
            &flow.designs,
            flow.notice.as_deref(),
            flow.error.as_deref(),
            &app.download_dir,
        ),
    }
}

/// Map a key press to a flow action for the current page.
///
/// Returns `true` when the app should quit.
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return true;
    }

    let action = match (app.flow.page, code) {
        (Page::Welcome | Page::Results, KeyCode::Char('q') | KeyCode::Esc) => return true,

        (Page::Welcome, KeyCode::Char('t') | KeyCode::Enter) => Action::ChooseTheme,
        (Page::Welcome, KeyCode::Char('s')) => Action::SurpriseMe,

        (Page::Theme, KeyCode::Char(c)) => {
            let mut theme = app.flow.theme.clone();
            theme.push(c);
            Action::EditTheme(theme)
        }
        (Page::Theme, KeyCode::Backspace) => {
            let mut theme = app.flow.theme.clone();
            theme.pop();
            Action::EditTheme(theme)
        }
        (Page::Theme, KeyCode::Enter) => Action::SubmitTheme,
        (Page::Theme, KeyCode::Esc) => Action::Back,

        (Page::Results, KeyCode::Char('r')) => Action::Reset,
        (Page::Results, KeyCode::Char(c)) => match c.to_digit(10) {
            Some(n @ 1..=9) => Action::Download(n as usize - 1),
            _ => return false,
        },

        _ => return false,
    };

    app.dispatch(action);
    false
}
