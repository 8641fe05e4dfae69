//! Generation batches: several prediction calls fanned out and joined.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;

use super::design::Design;
use super::error::{BatchError, RelayError};
use super::prompt::Prompt;
use super::provider::{ImageGenerator, ImageRef};
use crate::config::{Config, GenerationConfig};

/// Number of designs requested per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Something that turns a prompt into one image reference.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    async fn predict(&self, prompt: &Prompt) -> Result<ImageRef, RelayError>;
}

/// Calls a running relay server over HTTP.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    /// Create a client for the relay at `base_url` (e.g. `http://127.0.0.1:10000`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/predictions", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PredictionSource for RelayClient {
    async fn predict(&self, prompt: &Prompt) -> Result<ImageRef, RelayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "prompt": prompt.as_str() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
            });
        }

        // A body cut off mid-read is a transport failure, not a malformed answer
        let bytes = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&bytes).map_err(|e| RelayError::Malformed(e.to_string()))?;

        let output = body
            .get("output")
            .and_then(Value::as_array)
            .ok_or(RelayError::MissingOutput)?;

        output
            .first()
            .and_then(Value::as_str)
            .map(ImageRef::new)
            .ok_or_else(|| RelayError::Malformed("output[0] is not an image URL".to_string()))
    }
}

/// Calls the provider in-process with the same parameters the relay uses.
pub struct DirectSource {
    generator: Arc<dyn ImageGenerator>,
    generation: GenerationConfig,
}

impl DirectSource {
    #[must_use]
    pub fn new(generator: Arc<dyn ImageGenerator>, generation: GenerationConfig) -> Self {
        Self {
            generator,
            generation,
        }
    }
}

#[async_trait]
impl PredictionSource for DirectSource {
    async fn predict(&self, prompt: &Prompt) -> Result<ImageRef, RelayError> {
        let params = self.generation.params();
        Ok(self.generator.generate(prompt.as_str(), &params).await?)
    }
}

/// Pick the prediction source for `config`: the relay when one is
/// configured, otherwise the provider in-process.
#[must_use]
pub fn source_from_config(config: &Config) -> Arc<dyn PredictionSource> {
    match config.client.relay_url.as_deref() {
        Some(url) => {
            tracing::info!(relay = %url, "using relay server");
            Arc::new(RelayClient::new(url))
        }
        None => Arc::new(DirectSource::new(
            config.provider.create_provider(),
            config.generation.clone(),
        )),
    }
}

/// Issue `size` concurrent predictions for `prompt` and collect the designs.
///
/// Calls that fail outright are dropped and the rest kept. A malformed
/// answer from any call discards the whole batch. With no successes at all
/// the batch fails with [`BatchError::NoDesigns`].
pub async fn run_batch(
    source: &dyn PredictionSource,
    prompt: &Prompt,
    size: usize,
) -> Result<Vec<Design>, BatchError> {
    let calls = (0..size).map(|slot| async move { (slot, source.predict(prompt).await) });
    let results = join_all(calls).await;

    let mut designs = Vec::with_capacity(size);
    for (slot, result) in results {
        match result {
            Ok(image) => designs.push(Design::from_slot(slot, image)),
            Err(e) if e.is_malformed() => {
                tracing::error!(slot, error = %e, "malformed prediction, discarding batch");
                return Err(BatchError::Aborted(e));
            }
            Err(e) => {
                tracing::warn!(slot, error = %e, "prediction failed");
            }
        }
    }

    if designs.is_empty() {
        return Err(BatchError::NoDesigns);
    }

    tracing::info!(count = designs.len(), requested = size, "batch finished");
    Ok(designs)
}
