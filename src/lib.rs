//! Engraver - engraving-ready line art from a theme word.
//!
//! This library provides:
//! - a relay server that forwards prompts to a hosted image model
//! - a terminal UI that walks through theme entry, generation and download
//! - headless commands for scripting the same flow
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  ┌─────────────┐  ┌─────────────┐
//! │     CLI     │  │     TUI     │  │  Relay API  │
//! └──────┬──────┘  └──────┬──────┘  └──────┬──────┘
//!        │                │                │
//!        └────────────────┼────────────────┘
//!                         │
//!                  ┌──────┴──────┐
//!                  │    Core     │──▶ image provider
//!                  └─────────────┘
//! ```

pub mod api;
pub mod build_info;
pub mod cli;
pub mod config;
pub mod core;
pub mod tui;

pub use config::Config;
