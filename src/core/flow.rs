//! Screen flow as an immutable snapshot plus a pure reducer.
//!
//! ```text
//! Welcome ──ChooseTheme──▶ Theme ──SubmitTheme──▶ Loading ──ok──▶ Results
//!    │                      ▲  │                    │               │
//!    └──────SurpriseMe──────┼──┼───────────────────▶│               │
//!                           │  └──Back──▶ Welcome   │               │
//!                           └──────────err──────────┘               │
//! Welcome ◀────────────────────────Reset────────────────────────────┘
//! ```
//!
//! Side effects are returned as [`Effect`] values; the caller runs them and
//! feeds the outcome back in as another [`Action`].

use std::path::PathBuf;

use super::design::Design;
use super::error::BatchError;
use super::prompt::{Prompt, clamp_theme};

/// The screen currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// Landing screen with the two entry choices.
    #[default]
    Welcome,
    /// Theme word entry.
    Theme,
    /// Generation batch in flight.
    Loading,
    /// Generated designs.
    Results,
}

/// Snapshot of the whole flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowState {
    pub page: Page,
    /// Theme text as typed.
    pub theme: String,
    /// Never empty while `page` is `Results`.
    pub designs: Vec<Design>,
    /// Last failure shown to the user.
    pub error: Option<String>,
    /// Last download confirmation.
    pub notice: Option<String>,
}

/// Something the user did, or the outcome of an [`Effect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChooseTheme,
    SurpriseMe,
    EditTheme(String),
    Back,
    SubmitTheme,
    BatchFinished(Result<Vec<Design>, String>),
    Download(usize),
    DownloadFinished(Result<PathBuf, String>),
    Reset,
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run a generation batch for this prompt.
    Generate(Prompt),
    /// Save one design to disk.
    Download { url: String, name: String },
}

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: FlowState,
    pub effect: Option<Effect>,
}

impl Transition {
    const fn to(state: FlowState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn stay(state: &FlowState) -> Self {
        Self::to(state.clone())
    }
}

/// Apply `action` to `state`.
///
/// Actions that do not apply to the current page leave the state unchanged.
#[must_use]
pub fn reduce(state: &FlowState, action: Action) -> Transition {
    match (state.page, action) {
        (Page::Welcome, Action::ChooseTheme) => Transition::to(FlowState {
            page: Page::Theme,
            ..state.clone()
        }),

        (Page::Welcome, Action::SurpriseMe) => start_batch(state, Prompt::surprise()),

        (Page::Theme, Action::EditTheme(text)) => Transition::to(FlowState {
            theme: clamp_theme(&text),
            ..state.clone()
        }),

        (Page::Theme, Action::Back) => Transition::to(FlowState {
            page: Page::Welcome,
            ..state.clone()
        }),

        (Page::Theme, Action::SubmitTheme) => match Prompt::themed(&state.theme) {
            Some(prompt) => start_batch(state, prompt),
            None => Transition::stay(state),
        },

        (Page::Loading, Action::BatchFinished(Ok(designs))) if !designs.is_empty() => {
            Transition::to(FlowState {
                page: Page::Results,
                designs,
                error: None,
                ..state.clone()
            })
        }

        (Page::Loading, Action::BatchFinished(outcome)) => {
            let message = outcome.err().unwrap_or_else(|| BatchError::NoDesigns.to_string());
            Transition::to(FlowState {
                page: Page::Theme,
                designs: Vec::new(),
                error: Some(message),
                ..state.clone()
            })
        }

        (Page::Results, Action::Download(index)) => match state.designs.get(index) {
            Some(design) => Transition {
                state: FlowState {
                    notice: None,
                    error: None,
                    ..state.clone()
                },
                effect: Some(Effect::Download {
                    url: design.image_url.clone(),
                    name: design.name.clone(),
                }),
            },
            None => Transition::stay(state),
        },

        (Page::Results, Action::DownloadFinished(Ok(path))) => Transition::to(FlowState {
            notice: Some(format!("Saved {}", path.display())),
            error: None,
            ..state.clone()
        }),

        (Page::Results, Action::DownloadFinished(Err(message))) => Transition::to(FlowState {
            notice: None,
            error: Some(format!("Failed to download image: {message}")),
            ..state.clone()
        }),

        (Page::Results, Action::Reset) => Transition::to(FlowState::default()),

        _ => Transition::stay(state),
    }
}

fn start_batch(state: &FlowState, prompt: Prompt) -> Transition {
    Transition {
        state: FlowState {
            page: Page::Loading,
            designs: Vec::new(),
            error: None,
            notice: None,
            ..state.clone()
        },
        effect: Some(Effect::Generate(prompt)),
    }
}
