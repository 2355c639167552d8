//! Axum route handlers for the personalized page.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::jobs::SkillDetail;
use crate::personalized::presentation::SuggestionCard;
use crate::personalized::service::{JobsReport, PersonalizedReport};
use crate::personalized::view::{RequestSession, SessionContext, ViewSlots};
use crate::state::AppState;

/// Header the SPA uses to identify the signed-in user when no `email` query
/// parameter is given.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivateRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub view_id: Uuid,
    pub status: &'static str,
}

fn request_session(query: Option<&str>, headers: &HeaderMap) -> RequestSession {
    let header = headers
        .get(USER_EMAIL_HEADER)
        .and_then(|v| v.to_str().ok());
    let query = query.filter(|q| !q.trim().is_empty());
    RequestSession::new(query.or(header))
}

fn require_email(session: &dyn SessionContext) -> Result<String, AppError> {
    let email = session.current_user_email().ok_or(AppError::Unauthorized)?;
    if !email.contains('@') {
        return Err(AppError::Validation(format!("'{email}' is not an email address")));
    }
    Ok(email)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/personalized
///
/// Skills, filtered suggestions, job recommendations and the forecast flag in one response.
pub async fn handle_personalized(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
    headers: HeaderMap,
) -> Result<Json<PersonalizedReport>, AppError> {
    let email = require_email(&request_session(query.email.as_deref(), &headers))?;
    let report = state.personalized.activate(&email, Utc::now()).await?;
    Ok(Json(report))
}

/// GET /api/v1/personalized/jobs
pub async fn handle_recommended_jobs(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
    headers: HeaderMap,
) -> Result<Json<JobsReport>, AppError> {
    let email = require_email(&request_session(query.email.as_deref(), &headers))?;
    let jobs = state.personalized.recommended_jobs(&email, Utc::now()).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/personalized/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<SuggestionCard>>, AppError> {
    let email = require_email(&request_session(query.email.as_deref(), &headers))?;
    let cards = state.personalized.suggestions(&email).await?;
    Ok(Json(cards))
}

/// GET /api/v1/skills/:name
pub async fn handle_skill_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SkillDetail>, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("skill name cannot be empty".to_string()));
    }
    let detail = state.api.skill_details(name).await?;
    Ok(Json(detail))
}

/// POST /api/v1/views/:view_id/activate
///
/// Starts an activation in the background and returns immediately. A newer
/// activation on the same view supersedes any still in flight.
pub async fn handle_activate_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    headers: HeaderMap,
    body: Option<Json<ActivateRequest>>,
) -> (StatusCode, Json<ActivateResponse>) {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = request_session(request.email.as_deref(), &headers);
    let view = state.views.get_or_create(view_id).await;
    let service = state.personalized.clone();

    tokio::spawn(async move {
        view.activate(&session, &service, Utc::now()).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(ActivateResponse {
            view_id,
            status: "activating",
        }),
    )
}

/// GET /api/v1/views/:view_id
pub async fn handle_get_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<Json<ViewSlots>, AppError> {
    let view = state
        .views
        .get(view_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("View {view_id} not found")))?;
    Ok(Json(view.snapshot().await))
}

/// DELETE /api/v1/views/:view_id
pub async fn handle_close_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.views.remove(view_id).await {
        return Err(AppError::NotFound(format!("View {view_id} not found")));
    }
    debug!("closed view {view_id}");
    Ok(StatusCode::NO_CONTENT)
}
