//! HTTP relay server.
//!
//! Forwards one prompt per request to the image provider and hands back the
//! image reference. The server holds no per-request state.

// Allow clippy lint triggered by utoipa's OpenApi derive macro
#![allow(clippy::needless_for_each)]

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, GenerationConfig};
use crate::core::ImageGenerator;
use crate::core::secret::mask_secrets;

/// Path of the relay endpoint.
pub const PREDICTIONS_PATH: &str = "/api/predictions";

/// Shared application state.
pub struct AppState {
    /// The image provider.
    pub generator: Arc<dyn ImageGenerator>,

    /// Parameters sent with every call.
    pub generation: GenerationConfig,
}

type SharedState = Arc<AppState>;

/// `OpenAPI` documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Engraver relay API",
        description = "Relays engraving design prompts to the image provider",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(health, create_prediction),
    components(schemas(PredictionRequest, PredictionResponse, ErrorResponse, HealthResponse))
)]
struct ApiDoc;

/// Build the relay router.
pub fn router(state: AppState) -> Router {
    let predictions: MethodRouter<SharedState> =
        post(create_prediction).fallback(method_not_allowed);

    Router::new()
        .route(PREDICTIONS_PATH, predictions)
        .route("/api/health", get(health))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the relay server.
///
/// # Errors
///
/// Returns an error if the server fails to bind or start.
pub async fn serve(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState {
        generator: config.provider.create_provider(),
        generation: config.generation.clone(),
    };
    let app = router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(addr = %addr, model = %config.provider.model, "starting relay server");
    tracing::info!("POST http://{addr}{PREDICTIONS_PATH}");
    tracing::info!("GET  http://{addr}/api/health");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health response body.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service healthy", body = HealthResponse))
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Request body for the relay.
#[derive(Debug, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PredictionRequest {
    /// Full prompt text.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Successful relay response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PredictionResponse {
    /// Generated image references; always exactly one.
    pub output: Vec<String>,
}

/// Error body returned on failure.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Relay failures, mapped to HTTP responses.
#[derive(Debug)]
enum ApiError {
    MissingPrompt,
    MethodNotAllowed,
    Upstream { message: String, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::MissingPrompt => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "No prompt provided".to_string(),
                    details: None,
                },
            ),
            Self::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorResponse {
                    error: "Method not allowed".to_string(),
                    details: None,
                },
            ),
            Self::Upstream { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    details: Some(details),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Render an error and its sources, one per line, with secrets masked.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\ncaused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    mask_secrets(&chain).into_owned()
}

/// Relay a prompt to the image provider.
#[utoipa::path(
    post,
    path = "/api/predictions",
    request_body = PredictionRequest,
    responses(
        (status = 200, description = "Image generated", body = PredictionResponse),
        (status = 400, description = "No prompt provided", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Provider failure", body = ErrorResponse)
    )
)]
async fn create_prediction(
    State(state): State<SharedState>,
    body: Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected relay body");
            return Err(ApiError::MissingPrompt);
        }
    };

    let prompt = request
        .prompt
        .filter(|prompt| !prompt.trim().is_empty())
        .ok_or(ApiError::MissingPrompt)?;

    let request_id = uuid::Uuid::new_v4();
    let params = state.generation.params();
    tracing::info!(
        %request_id,
        provider = state.generator.name(),
        seed = params.seed,
        prompt_len = prompt.len(),
        "received prompt"
    );

    match state.generator.generate(&prompt, &params).await {
        Ok(image) => {
            tracing::info!(%request_id, url = %image, "prediction created");
            Ok(Json(PredictionResponse {
                output: vec![image.into_string()],
            }))
        }
        Err(e) => {
            let message = mask_secrets(&e.to_string()).into_owned();
            tracing::error!(%request_id, error = %message, "prediction failed");
            Err(ApiError::Upstream {
                details: error_chain(&e),
                message,
            })
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::core::{GenerationError, GenerationParams, ImageRef};

    /// Returns a fixed URL, or a fixed error, and counts calls.
    struct StubGenerator {
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ImageGenerator for StubGenerator {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn generate(
            &self,
            prompt: &str,
            params: &GenerationParams,
        ) -> Result<ImageRef, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(params.aspect_ratio, "1:1");
            if self.fail {
                Err(GenerationError::CredentialMissing {
                    env: "REPLICATE_API_TOKEN".to_string(),
                })
            } else {
                Ok(ImageRef::new(format!("https://cdn.example/{}.png", prompt.len())))
            }
        }
    }

    fn create_test_router(fail: bool) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let state = AppState {
            generator: Arc::new(StubGenerator {
                fail,
                calls: calls.clone(),
            }),
            generation: GenerationConfig::default(),
        };
        (router(state), calls)
    }

    fn post_json(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(PREDICTIONS_PATH)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (app, _) = create_test_router(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = json_body(response).await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn prompt_returns_output_envelope() {
        let (app, calls) = create_test_router(false);

        let response = app.oneshot(post_json(r#"{"prompt": "owl"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: PredictionResponse = json_body(response).await;
        assert_eq!(body.output, vec!["https://cdn.example/3.png".to_string()]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_prompt_is_bad_request() {
        let (app, calls) = create_test_router(false);

        let response = app.oneshot(post_json("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error, "No prompt provided");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_prompt_is_bad_request() {
        let (app, calls) = create_test_router(false);

        let response = app.oneshot(post_json(r#"{"prompt": "  "}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_json_is_bad_request() {
        let (app, _) = create_test_router(false);

        let response = app.oneshot(post_json("not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let (app, calls) = create_test_router(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(PREDICTIONS_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error, "Method not allowed");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_server_error() {
        let (app, calls) = create_test_router(true);

        let response = app.oneshot(post_json(r#"{"prompt": "owl"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error, "REPLICATE_API_TOKEN is not configured");
        assert!(body.details.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_chain_masks_secrets() {
        let err = GenerationError::Api {
            status: 401,
            message: "bad token r8_abcdefghijklmnopqrstuvwxyz".to_string(),
        };
        let chain = error_chain(&err);
        assert!(chain.contains("[MASKED_REPLICATE_TOKEN]"));
        assert!(!chain.contains("r8_abc"));
    }

    #[test]
    fn prediction_request_tolerates_missing_prompt() {
        let req: PredictionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.prompt.is_none());
    }
}
