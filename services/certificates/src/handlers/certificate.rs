use anyhow::Context as _;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::number::safe_file_stem;
use crate::domain::types::CertificateStatus;
use crate::error::CertificatesServiceError;
use crate::state::AppState;
use crate::usecase::sign::short_hash;
use crate::usecase::verify::VerifyCertificateUseCase;

// ── POST /attendees/{attendee_id}/certificate ────────────────────────────────

#[derive(Serialize)]
pub struct CertificateResponse {
    pub id: String,
    pub number: String,
    pub status: CertificateStatus,
    #[serde(serialize_with = "acara_core::serde::to_rfc3339_ms")]
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub short_hash: String,
    pub verification_url: String,
}

pub async fn issue_certificate(
    State(state): State<AppState>,
    Path(attendee_id): Path<Uuid>,
) -> Result<(StatusCode, Json<CertificateResponse>), CertificatesServiceError> {
    let certificate = state.issue_usecase().execute(attendee_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CertificateResponse {
            id: certificate.id.to_string(),
            short_hash: short_hash(certificate.id),
            verification_url: state
                .signer
                .verification_url(certificate.id, certificate.issued_at),
            status: certificate.status,
            issued_at: certificate.issued_at,
            number: certificate.number,
        }),
    ))
}

// ── GET /attendees/{attendee_id}/certificate ─────────────────────────────────

pub async fn download_certificate(
    State(state): State<AppState>,
    Path(attendee_id): Path<Uuid>,
) -> Result<Response, CertificatesServiceError> {
    let (certificate, bytes) = state.issue_usecase().download(attendee_id).await?;

    let filename = format!("{}.pdf", safe_file_stem(&certificate.number));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .context("build content-disposition header")?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// ── GET /certificates/{certificate_id}/verify ────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyQuery {
    pub sig: Option<String>,
}

#[derive(Serialize)]
pub struct VerifiedCertificate {
    pub number: String,
    pub status: CertificateStatus,
    #[serde(serialize_with = "acara_core::serde::to_rfc3339_ms")]
    pub issued_at: chrono::DateTime<chrono::Utc>,
    pub short_hash: String,
}

#[derive(Serialize)]
pub struct VerifiedAttendee {
    pub name: String,
}

#[derive(Serialize)]
pub struct VerifiedEvent {
    pub name: String,
    #[serde(serialize_with = "acara_core::serde::to_rfc3339_ms")]
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub organizer: String,
}

#[derive(Serialize)]
pub struct VerificationResponse {
    pub certificate: VerifiedCertificate,
    pub attendee: VerifiedAttendee,
    pub event: VerifiedEvent,
}

pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(certificate_id): Path<Uuid>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<VerificationResponse>, CertificatesServiceError> {
    let usecase = VerifyCertificateUseCase {
        certificate_repo: state.certificate_repo(),
        signer: state.signer.clone(),
    };

    let details = usecase.execute(certificate_id, query.sig).await.inspect_err(|e| {
        if matches!(e, CertificatesServiceError::Internal(_)) {
            tracing::error!(certificate_id = %certificate_id, "verification failed");
        }
    })?;

    let record = details.record;

    Ok(Json(VerificationResponse {
        certificate: VerifiedCertificate {
            number: record.certificate.number,
            status: record.certificate.status,
            issued_at: record.certificate.issued_at,
            short_hash: details.short_hash,
        },
        attendee: VerifiedAttendee { name: record.attendee_name },
        event: VerifiedEvent {
            name: record.event_name,
            start_time: record.event_start_time,
            organizer: record.event_organizer,
        },
    }))
}
