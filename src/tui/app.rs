//! TUI application state.

use std::path::PathBuf;
use std::sync::Arc;

use rand::prelude::IndexedRandom;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::core::download::download_design;
use crate::core::{Action, Design, Effect, FlowState, PredictionSource, Prompt, reduce, run_batch};

/// Block-letter logo lines.
pub const LOGO_LINES: &[&str] = &[
    "█▀▀ █▄ █ █▀▀ █▀█ ▄▀█ █ █ █▀▀ █▀█",
    "██▄ █ ▀█ █▄█ █▀▄ █▀█ ▀▄▀ ██▄ █▀▄",
];

/// Rotating taglines for the welcome screen.
const TAGLINES: &[&str] = &[
    "one word, one of a kind",
    "bold lines, no noise",
    "made to be engraved",
    "never made twice",
];

/// Spinner frames for the loading screen.
pub const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

type BatchResult = Result<Vec<Design>, String>;
type DownloadResult = Result<PathBuf, String>;

/// Application state for the TUI.
pub struct App {
    /// Current flow snapshot.
    pub flow: FlowState,

    /// Selected tagline for the welcome screen.
    pub tagline: &'static str,

    /// Current spinner frame index.
    pub spinner: usize,

    /// Model name shown in the footer.
    pub model: String,

    /// Where designs are saved.
    pub download_dir: PathBuf,

    source: Arc<dyn PredictionSource>,
    http: reqwest::Client,
    batch_size: usize,

    batch_tx: mpsc::UnboundedSender<BatchResult>,
    batch_rx: mpsc::UnboundedReceiver<BatchResult>,
    download_tx: mpsc::UnboundedSender<DownloadResult>,
    download_rx: mpsc::UnboundedReceiver<DownloadResult>,
}

impl App {
    /// Create the app around a prediction source.
    #[must_use]
    pub fn new(source: Arc<dyn PredictionSource>, config: &Config) -> Self {
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let (download_tx, download_rx) = mpsc::unbounded_channel();
        let tagline = TAGLINES.choose(&mut rand::rng()).copied().unwrap_or("");

        Self {
            flow: FlowState::default(),
            tagline,
            spinner: 0,
            model: config.provider.model.clone(),
            download_dir: config.client.download_dir(),
            source,
            http: reqwest::Client::new(),
            batch_size: config.generation.batch_size,
            batch_tx,
            batch_rx,
            download_tx,
            download_rx,
        }
    }

    /// Apply an action and start whatever work it asks for.
    pub fn dispatch(&mut self, action: Action) {
        let transition = reduce(&self.flow, action);
        if transition.state.page != self.flow.page {
            tracing::debug!(from = ?self.flow.page, to = ?transition.state.page, "page change");
        }
        self.flow = transition.state;

        if let Some(effect) = transition.effect {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Generate(prompt) => self.spawn_batch(prompt),
            Effect::Download { url, name } => self.spawn_download(url, name),
        }
    }

    fn spawn_batch(&self, prompt: Prompt) {
        let source = Arc::clone(&self.source);
        let tx = self.batch_tx.clone();
        let size = self.batch_size;

        tokio::spawn(async move {
            let result = run_batch(source.as_ref(), &prompt, size)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    fn spawn_download(&self, url: String, name: String) {
        let http = self.http.clone();
        let dir = self.download_dir.clone();
        let tx = self.download_tx.clone();

        tokio::spawn(async move {
            let result = download_design(&http, &url, &name, &dir)
                .await
                .map_err(|e| {
                    tracing::warn!(url = %url, error = %e, "download failed");
                    e.to_string()
                });
            let _ = tx.send(result);
        });
    }

    /// Feed finished background work back into the flow.
    pub fn poll_tasks(&mut self) {
        while let Ok(result) = self.batch_rx.try_recv() {
            self.dispatch(Action::BatchFinished(result));
        }
        while let Ok(result) = self.download_rx.try_recv() {
            self.dispatch(Action::DownloadFinished(result));
        }
    }

    /// Advance the spinner.
    pub const fn tick(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER.len();
    }

    /// Current spinner glyph.
    #[must_use]
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER[self.spinner % SPINNER.len()]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::core::{ImageRef, Page, RelayError};

    /// Records prompts, optionally failing every call.
    struct Recording {
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail_all: bool,
    }

    impl Recording {
        fn new(fail_all: bool) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_all,
            })
        }
    }

    #[async_trait]
    impl PredictionSource for Recording {
        async fn predict(&self, prompt: &Prompt) -> Result<ImageRef, RelayError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.as_str().to_string());
            if self.fail_all {
                Err(RelayError::Status { status: 500 })
            } else {
                Ok(ImageRef::new(format!("https://cdn.example/{n}.png")))
            }
        }
    }

    async fn settle(app: &mut App, page: Page) {
        for _ in 0..100 {
            app.poll_tasks();
            if app.flow.page == page {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("never reached {page:?}, stuck on {:?}", app.flow.page);
    }

    #[tokio::test]
    async fn themed_batch_reaches_results() {
        let source = Recording::new(false);
        let mut app = App::new(source.clone(), &Config::default());

        app.dispatch(Action::ChooseTheme);
        app.dispatch(Action::EditTheme("whale".to_string()));
        app.dispatch(Action::SubmitTheme);
        assert_eq!(app.flow.page, Page::Loading);

        settle(&mut app, Page::Results).await;
        assert_eq!(app.flow.designs.len(), 3);

        let prompts = source.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p.contains("illustration of whale")));
    }

    #[tokio::test]
    async fn failed_batch_returns_to_theme() {
        let mut app = App::new(Recording::new(true), &Config::default());

        app.dispatch(Action::SurpriseMe);
        settle(&mut app, Page::Theme).await;

        assert_eq!(
            app.flow.error.as_deref(),
            Some("Failed to generate any designs. Please try again.")
        );
    }

    #[tokio::test]
    async fn blank_submit_starts_nothing() {
        let source = Recording::new(false);
        let mut app = App::new(source.clone(), &Config::default());

        app.dispatch(Action::ChooseTheme);
        app.dispatch(Action::EditTheme("   ".to_string()));
        app.dispatch(Action::SubmitTheme);

        tokio::time::sleep(Duration::from_millis(20)).await;
        app.poll_tasks();
        assert_eq!(app.flow.page, Page::Theme);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn spinner_wraps() {
        let mut app = App::new(Recording::new(false), &Config::default());
        for _ in 0..SPINNER.len() {
            app.tick();
        }
        assert_eq!(app.spinner, 0);
        assert_eq!(app.spinner_frame(), SPINNER[0]);
    }
}
