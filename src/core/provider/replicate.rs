//! Replicate provider implementation.
//!
//! Runs a model through the Replicate predictions API. The create call asks
//! the server to hold the connection (`Prefer: wait`); predictions that are
//! still running afterwards are polled through their `urls.get` link.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationParams, ImageGenerator, ImageRef};
use crate::core::error::GenerationError;

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";
pub const DEFAULT_MODEL: &str = "google/imagen-3";

const DEFAULT_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Image provider backed by the Replicate API.
#[derive(Debug, Clone)]
pub struct ReplicateProvider {
    http: reqwest::Client,
    api_token: Option<String>,
    token_env: String,
    api_base: String,
    model: String,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl ReplicateProvider {
    /// Create a provider for the default model and endpoint.
    ///
    /// A missing token is accepted here and reported on the first request.
    #[must_use]
    pub fn new(api_token: Option<String>) -> Self {
        Self::with_config(api_token, None, DEFAULT_MODEL)
    }

    /// Create a provider with an explicit endpoint and model.
    #[must_use]
    pub fn with_config(
        api_token: Option<String>,
        api_base: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_token: api_token.filter(|token| !token.trim().is_empty()),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            api_base: api_base
                .map(|base| base.trim().trim_end_matches('/').to_string())
                .filter(|base| !base.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: model.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Name of the environment variable the token came from, for error messages.
    #[must_use]
    pub fn with_token_env(mut self, token_env: impl Into<String>) -> Self {
        self.token_env = token_env.into();
        self
    }

    /// Override polling cadence for predictions that outlive the initial wait.
    #[must_use]
    pub const fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    fn predictions_endpoint(&self) -> String {
        format!("{}/models/{}/predictions", self.api_base, self.model)
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: truncate(&body, MAX_ERROR_BODY),
            });
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))
    }

    async fn poll(
        &self,
        mut prediction: Prediction,
        token: &str,
    ) -> Result<Prediction, GenerationError> {
        let started = Instant::now();

        loop {
            match prediction.status.as_str() {
                "succeeded" => return Ok(prediction),
                "failed" | "canceled" => {
                    return Err(GenerationError::Prediction {
                        message: prediction.error_message(),
                        status: prediction.status,
                    });
                }
                "starting" | "processing" => {}
                other => {
                    return Err(GenerationError::Parse(format!(
                        "unexpected prediction status '{other}'"
                    )));
                }
            }

            if started.elapsed() >= self.poll_timeout {
                return Err(GenerationError::Timeout(self.poll_timeout));
            }

            let poll_url = prediction
                .urls
                .as_ref()
                .and_then(|urls| urls.get.as_deref())
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .ok_or_else(|| GenerationError::Parse("prediction missing poll URL".to_string()))?
                .to_string();

            tokio::time::sleep(self.poll_interval).await;
            tracing::debug!(id = ?prediction.id, url = %poll_url, "polling prediction");

            let response = self.http.get(&poll_url).bearer_auth(token).send().await?;
            prediction = Self::read_prediction(response).await?;
        }
    }
}

// Replicate request types

#[derive(Debug, Serialize)]
struct PredictionRequest<'a> {
    input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    aspect_ratio: &'a str,
    negative_prompt: &'a str,
    safety_filter_level: &'a str,
    seed: u32,
}

// Replicate response types

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

impl Prediction {
    fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(Value::Null) | None => "no error detail".to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// First usable image URL in a prediction output.
///
/// Models return either a bare string, a list of strings, or objects with a
/// `url` field.
fn first_output_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) => {
            let trimmed = url.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Array(items) => items.iter().find_map(first_output_url),
        Value::Object(obj) => obj.get("url").and_then(first_output_url),
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[async_trait]
impl ImageGenerator for ReplicateProvider {
    fn name(&self) -> &'static str {
        "replicate"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ImageRef, GenerationError> {
        let Some(token) = self.api_token.as_deref() else {
            return Err(GenerationError::CredentialMissing {
                env: self.token_env.clone(),
            });
        };

        let body = PredictionRequest {
            input: PredictionInput {
                prompt,
                aspect_ratio: &params.aspect_ratio,
                negative_prompt: &params.negative_prompt,
                safety_filter_level: &params.safety_filter_level,
                seed: params.seed,
            },
        };

        let endpoint = self.predictions_endpoint();
        tracing::info!(model = %self.model, seed = params.seed, "creating prediction");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await?;

        let prediction = Self::read_prediction(response).await?;
        let prediction = self.poll(prediction, token).await?;

        let url = prediction
            .output
            .as_ref()
            .and_then(first_output_url)
            .ok_or(GenerationError::EmptyOutput)?;

        tracing::info!(id = ?prediction.id, url = %url, "prediction succeeded");
        Ok(ImageRef::new(url))
    }
}
