//! Image provider abstraction.

mod replicate;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::GenerationError;

pub use replicate::{DEFAULT_API_BASE, DEFAULT_MODEL, ReplicateProvider};

/// Exclusive upper bound for randomly drawn seeds.
pub const MAX_SEED: u32 = 1_000_000;

/// Reference to a generated image, usually a URL on the provider's CDN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed knobs sent alongside every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    /// Output aspect ratio, e.g. `1:1`.
    pub aspect_ratio: String,
    /// Comma separated blocklist of unwanted content.
    pub negative_prompt: String,
    /// Provider safety filter level.
    pub safety_filter_level: String,
    /// Seed for this call. Drawn fresh per call so identical prompts differ.
    pub seed: u32,
}

/// Trait for image generation providers.
///
/// Implement this to plug in another hosted model.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &'static str;

    /// Generate one image for `prompt`.
    ///
    /// Each call is billed by the provider; nothing is cached or retried.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ImageRef, GenerationError>;
}
