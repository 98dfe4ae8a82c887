use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Certificates service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CertificatesServiceError {
    #[error("attendee not found")]
    AttendeeNotFound,
    #[error("certificate not found")]
    CertificateNotFound,
    #[error("certificates not enabled for this event")]
    CertificatesNotEnabled,
    #[error("attendance not confirmed")]
    AttendanceNotConfirmed,
    #[error("registration cancelled")]
    RegistrationCancelled,
    #[error("missing signature")]
    MissingSignature,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("certificate revoked")]
    CertificateRevoked,
    #[error("invalid check-in token")]
    InvalidCheckinToken,
    #[error("certificate number sequence exhausted")]
    SequenceExhausted,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CertificatesServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AttendeeNotFound => "ATTENDEE_NOT_FOUND",
            Self::CertificateNotFound => "CERTIFICATE_NOT_FOUND",
            Self::CertificatesNotEnabled => "CERTIFICATES_NOT_ENABLED",
            Self::AttendanceNotConfirmed => "ATTENDANCE_NOT_CONFIRMED",
            Self::RegistrationCancelled => "REGISTRATION_CANCELLED",
            Self::MissingSignature => "MISSING_SIGNATURE",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::CertificateRevoked => "CERTIFICATE_REVOKED",
            Self::InvalidCheckinToken => "INVALID_CHECKIN_TOKEN",
            Self::SequenceExhausted => "SEQUENCE_EXHAUSTED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CertificatesServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::AttendeeNotFound | Self::CertificateNotFound => StatusCode::NOT_FOUND,
            Self::CertificatesNotEnabled
            | Self::AttendanceNotConfirmed
            | Self::RegistrationCancelled => StatusCode::CONFLICT,
            Self::MissingSignature => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::UNPROCESSABLE_ENTITY,
            Self::CertificateRevoked => StatusCode::GONE,
            Self::InvalidCheckinToken => StatusCode::UNAUTHORIZED,
            Self::SequenceExhausted | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable;
        // sequence exhaustion means the retry window is full and an operator must look.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            Self::SequenceExhausted => {
                tracing::error!(kind = "SEQUENCE_EXHAUSTED", "certificate number sequence exhausted");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
