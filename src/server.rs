use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Form, FromRequest, Request, State},
    http::header::CONTENT_TYPE,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::review::orchestrator::ReviewPipeline;
use crate::types::ReviewResult;

/// Shared state behind the HTTP surface. One pipeline serves all submissions;
/// each submission is independent and carries no cross-request state.
pub struct AppState {
    pub pipeline: ReviewPipeline,
}

/// Run the review service until the process exits.
pub async fn serve(state: Arc<AppState>, bind: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = bind.parse()?;
    let router = build_router(state);

    info!("Review service listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/review", post(review))
        .route("/api/suggest-fix", post(suggest_fix))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Review submission body. Missing fields become empty strings so they fail
/// validation with a field-specific message instead of a 422.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub code: String,
}

/// Fallback message when the request body cannot be decoded at all
const INVALID_INPUT_MESSAGE: &str = "Invalid input.";

/// One submission, one response. Always 200: failures are data the front-end
/// renders, not HTTP errors.
async fn review(State(state): State<Arc<AppState>>, request: Request) -> Json<ReviewResult> {
    let body = match parse_submission(request).await {
        Ok(body) => body,
        Err(result) => return Json(result),
    };
    Json(state.pipeline.submit(&body.file_name, &body.code).await)
}

/// Accept either the front-end's URL-encoded form post or a JSON body. An
/// undecodable body still answers 200, with the error as data.
async fn parse_submission(request: Request) -> Result<ReviewBody, ReviewResult> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("application/x-www-form-urlencoded") {
        match Form::<ReviewBody>::from_request(request, &()).await {
            Ok(Form(body)) => Ok(body),
            Err(rejection) => {
                warn!("Rejected form submission: {}", rejection);
                Err(ReviewResult::error(INVALID_INPUT_MESSAGE))
            }
        }
    } else {
        match Json::<ReviewBody>::from_request(request, &()).await {
            Ok(Json(body)) => Ok(body),
            Err(rejection) => {
                warn!("Rejected JSON submission: {}", rejection);
                Err(ReviewResult::error(INVALID_INPUT_MESSAGE))
            }
        }
    }
}

#[derive(Deserialize)]
pub struct SuggestFixBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub issue: String,
    #[serde(default)]
    pub file: String,
}

async fn suggest_fix(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SuggestFixBody>,
) -> Json<Value> {
    match state
        .pipeline
        .suggest_fix(&body.code, &body.issue, &body.file)
        .await
    {
        Ok(fix) => Json(json!({ "fix": fix })),
        Err(e) => Json(json!({ "error": e.user_message() })),
    }
}
