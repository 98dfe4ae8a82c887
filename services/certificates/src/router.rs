use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use acara_core::health::healthz;
use acara_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    certificate::{download_certificate, issue_certificate, verify_certificate},
    checkin::{check_in, current_checkin_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Certificates
        .route("/attendees/{attendee_id}/certificate", post(issue_certificate))
        .route("/attendees/{attendee_id}/certificate", get(download_certificate))
        .route("/certificates/{certificate_id}/verify", get(verify_certificate))
        // Check-in
        .route("/attendees/{attendee_id}/check-in", post(check_in))
        .route("/attendees/{attendee_id}/check-in-token", get(current_checkin_token))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(propagate_request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

/// Readiness — the service cannot serve anything without its database.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness probe failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
