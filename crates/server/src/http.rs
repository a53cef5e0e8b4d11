//! HTTP endpoints
//!
//! REST surface for the chat agent: the public chat operation, interaction
//! feedback, the training moderation routes, and the knowledge export
//! trigger.

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use chat_agent_core::{Error, NewTrainingEntry, TrainingFilter, TrainingUpdate};

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_origins);

    Router::new()
        // Public chat operation
        .route("/api/chat", post(chat))
        // Feedback on a served reply
        .route("/api/interactions/:id/feedback", post(interaction_feedback))
        // Training moderation
        .route("/api/training", get(list_training).post(create_training))
        .route("/api/training/:id", patch(update_training))
        .route("/api/training/approve", post(bulk_approve))
        .route("/api/training/needs-review", get(needs_review_count))
        .route("/api/training/categories", get(training_categories))
        // Admin
        .route("/admin/export-knowledge", post(export_knowledge))
        // Health check
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins; no origins means a
/// permissive layer for development
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin = %origin, "Invalid CORS origin ignored");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::warn!("No CORS origins configured, allowing all origins (development only)");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn map_core_error(e: Error) -> (StatusCode, Json<ErrorBody>) {
    match e {
        Error::Validation(msg) => error_response(StatusCode::BAD_REQUEST, msg),
        Error::NotFound(msg) => error_response(StatusCode::NOT_FOUND, msg),
        other => {
            tracing::error!(error = %other, "Request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    conversation_id: String,
    interaction_id: Option<Uuid>,
}

/// Handle one chat message
///
/// The whole resolution is wrapped in a caller-level timeout; on expiry the
/// client still gets a holding reply rather than an error.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)> {
    let timeout = Duration::from_secs(state.settings.pipeline.request_timeout_secs);

    let handled = tokio::time::timeout(
        timeout,
        state
            .pipeline
            .handle_message(&request.message, request.conversation_id.as_deref()),
    )
    .await;

    match handled {
        Ok(Ok(handled)) => Ok(Json(ChatResponse {
            response: handled.response,
            conversation_id: handled.conversation_id,
            interaction_id: Some(handled.interaction_id),
        })),
        Ok(Err(e)) => Err(map_core_error(e)),
        Err(_) => {
            tracing::error!("Message handling timed out, returning holding reply");
            Ok(Json(ChatResponse {
                response:
                    "I'm still learning about general questions. Our team will review this shortly."
                        .to_string(),
                conversation_id: request
                    .conversation_id
                    .unwrap_or_else(|| Uuid::new_v4().to_string()),
                interaction_id: None,
            }))
        }
    }
}

// =============================================================================
// Feedback
// =============================================================================

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    was_helpful: bool,
    feedback: Option<String>,
}

async fn interaction_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    state
        .learning
        .record_feedback(id, request.was_helpful, request.feedback)
        .await
        .map_err(map_core_error)?;

    Ok(Json(serde_json::json!({
        "message": "Feedback submitted successfully",
    })))
}

// =============================================================================
// Training moderation
// =============================================================================

#[derive(Debug, Deserialize)]
struct TrainingListQuery {
    category: Option<String>,
    search: Option<String>,
    needs_review: Option<bool>,
}

async fn list_training(
    State(state): State<AppState>,
    Query(query): Query<TrainingListQuery>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let entries = state
        .store
        .list(TrainingFilter {
            category: query.category,
            search: query.search,
            needs_review: query.needs_review,
        })
        .await
        .map_err(map_core_error)?;

    Ok(Json(serde_json::json!({
        "count": entries.len(),
        "entries": entries,
    })))
}

#[derive(Debug, Deserialize)]
struct CreateTrainingRequest {
    trigger: String,
    response: String,
    category: Option<String>,
    #[serde(default)]
    keywords: Vec<String>,
    trained_by: Option<String>,
}

/// Human-authored entries arrive answered and approved
async fn create_training(
    State(state): State<AppState>,
    Json(request): Json<CreateTrainingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<ErrorBody>)> {
    if request.trigger.trim().is_empty() || request.response.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "trigger and response are required",
        ));
    }

    let keywords = if request.keywords.is_empty() {
        chat_agent_text_processing::analyze(&request.trigger).keywords
    } else {
        request.keywords
    };

    let entry = state
        .store
        .create(NewTrainingEntry {
            trigger: request.trigger,
            response: request.response,
            category: request.category,
            keywords,
            is_active: true,
            needs_review: false,
            trained_by: request.trained_by,
        })
        .await
        .map_err(map_core_error)?;

    state.learning.invalidate_caches().await;

    Ok((StatusCode::CREATED, Json(serde_json::json!(entry))))
}

#[derive(Debug, Deserialize)]
struct UpdateTrainingRequest {
    response: Option<String>,
    category: Option<String>,
    is_active: Option<bool>,
    needs_review: Option<bool>,
}

async fn update_training(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<UpdateTrainingRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let entry = state
        .store
        .update(
            id,
            TrainingUpdate {
                response: request.response,
                category: request.category,
                is_active: request.is_active,
                needs_review: request.needs_review,
                success_rate: None,
            },
        )
        .await
        .map_err(map_core_error)?;

    state.learning.invalidate_caches().await;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": entry,
    })))
}

#[derive(Debug, Deserialize)]
struct BulkApproveRequest {
    ids: Vec<u64>,
}

async fn bulk_approve(
    State(state): State<AppState>,
    Json(request): Json<BulkApproveRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let mut approved = 0usize;
    for id in request.ids {
        match state
            .store
            .update(
                id,
                TrainingUpdate {
                    needs_review: Some(false),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(_) => approved += 1,
            Err(Error::NotFound(_)) => {
                tracing::warn!(training_id = id, "Bulk approve skipped unknown entry");
            }
            Err(e) => return Err(map_core_error(e)),
        }
    }

    state.learning.invalidate_caches().await;

    Ok(Json(serde_json::json!({
        "message": "Responses approved",
        "approved": approved,
    })))
}

async fn needs_review_count(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let pending = state
        .store
        .list(TrainingFilter {
            needs_review: Some(true),
            ..Default::default()
        })
        .await
        .map_err(map_core_error)?;

    Ok(Json(serde_json::json!({ "count": pending.len() })))
}

async fn training_categories(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    let categories = state.store.categories().await.map_err(map_core_error)?;
    Ok(Json(serde_json::json!({ "categories": categories })))
}

// =============================================================================
// Admin
// =============================================================================

async fn export_knowledge(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorBody>)> {
    match state.exporter.export().await {
        Ok(exported) => Ok(Json(serde_json::json!({ "exported": exported }))),
        Err(e) => {
            tracing::error!(error = %e, "Knowledge export failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export failed",
            ))
        }
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_agent_config::Settings;

    #[test]
    fn router_builds_on_default_settings() {
        let state = AppState::new(Settings::default()).unwrap();
        let _router = create_router(state);
    }

    #[test]
    fn invalid_cors_origins_are_ignored() {
        let layer = build_cors_layer(&["not a header value\n".to_string()]);
        // Falls back to the permissive development layer
        let _ = layer;
    }
}
