//! Core logic shared by the relay server, the TUI and the headless commands.

pub mod batch;
pub mod design;
pub mod download;
mod error;
pub mod flow;
pub mod prompt;
pub mod provider;
pub mod secret;

pub use batch::{DirectSource, PredictionSource, RelayClient, run_batch, source_from_config};
pub use design::Design;
pub use error::{BatchError, DownloadError, GenerationError, RelayError};
pub use flow::{Action, Effect, FlowState, Page, Transition, reduce};
pub use prompt::Prompt;
pub use provider::{GenerationParams, ImageGenerator, ImageRef, ReplicateProvider};
