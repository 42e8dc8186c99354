// handlers/protected/meetings.rs - /api/meetings (tenant scoped)

use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gateway::TrustedIdentity;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::store::{Meeting, NewMeeting};

/// GET /api/meetings - meetings of the caller's company
pub async fn meetings_list(
    identity: TrustedIdentity,
    State(state): State<AppState>,
) -> ApiResult<Vec<Meeting>> {
    let company_id = identity.require_company()?;
    Ok(ApiResponse::success(state.meetings.list(company_id).await))
}

/// POST /api/meetings - create a meeting in the caller's company
pub async fn meeting_create(
    identity: TrustedIdentity,
    State(state): State<AppState>,
    body: Result<Json<NewMeeting>, JsonRejection>,
) -> ApiResult<Meeting> {
    let company_id = identity.require_company()?;
    let Json(new) = body?;

    if new.title.trim().is_empty() {
        let mut field_errors = HashMap::new();
        field_errors.insert("title".to_string(), "This field is required".to_string());
        return Err(ApiError::validation_error("Missing required fields", Some(field_errors)));
    }

    let meeting = state
        .meetings
        .create(company_id, identity.user_id(), new)
        .await;

    tracing::info!(
        meeting_id = %meeting.id,
        company_id,
        created_by = identity.user_id(),
        "meeting created"
    );

    Ok(ApiResponse::created(meeting))
}

/// GET /api/meetings/:id - a meeting, if it belongs to the caller's company
pub async fn meeting_get(
    identity: TrustedIdentity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Meeting> {
    let company_id = identity.require_company()?;

    state
        .meetings
        .get(company_id, id)
        .await
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found(format!("Meeting '{}' not found", id)))
}
