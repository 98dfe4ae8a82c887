use anyhow::Context as _;
use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CertificatesServiceError;
use crate::state::AppState;
use crate::usecase::checkin::{CheckInTokenUseCase, CheckInUseCase};

// ── POST /attendees/{attendee_id}/check-in ───────────────────────────────────

#[derive(Deserialize)]
pub struct CheckInRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct CheckInResponse {
    #[serde(serialize_with = "acara_core::serde::to_rfc3339_ms")]
    pub attended_at: chrono::DateTime<chrono::Utc>,
}

pub async fn check_in(
    State(state): State<AppState>,
    Path(attendee_id): Path<Uuid>,
    Json(body): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, CertificatesServiceError> {
    let usecase = CheckInUseCase { attendee_repo: state.attendee_repo() };
    let attendee = usecase.execute(attendee_id, &body.token, Utc::now()).await?;

    let attended_at = attendee
        .attended_at
        .context("attendance timestamp missing after check-in")?;

    Ok(Json(CheckInResponse { attended_at }))
}

// ── GET /attendees/{attendee_id}/check-in-token ──────────────────────────────

#[derive(Serialize)]
pub struct CheckInTokenResponse {
    pub token: String,
    #[serde(serialize_with = "acara_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

pub async fn current_checkin_token(
    State(state): State<AppState>,
    Path(attendee_id): Path<Uuid>,
) -> Result<Json<CheckInTokenResponse>, CertificatesServiceError> {
    let usecase = CheckInTokenUseCase { attendee_repo: state.attendee_repo() };
    let token = usecase.execute(attendee_id, Utc::now()).await?;

    Ok(Json(CheckInTokenResponse { token: token.token, expires_at: token.expires_at }))
}
