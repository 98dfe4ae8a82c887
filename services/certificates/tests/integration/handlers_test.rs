use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use uuid::Uuid;

use acara_certificates::router::build_router;
use acara_certificates::state::AppState;
use acara_certificates::usecase::checkin::verify_checkin_token;
use acara_certificates::usecase::sign::short_hash;
use acara_certificates_schema::{attendees, certificates, events, registrations};

use crate::helpers::test_signer;

fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        signer: test_signer(),
        logo_path: PathBuf::from("logo.png"),
        storage_root: std::env::temp_dir(),
    }
}

fn test_server(db: DatabaseConnection) -> TestServer {
    TestServer::new(build_router(test_state(db))).unwrap()
}

/// Mock connection with no prepared results: any query errors, so a clean
/// response proves the route never touched the database.
fn queryless_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

// ── Row fixtures ─────────────────────────────────────────────────────────────

fn event_row() -> events::Model {
    events::Model {
        id: Uuid::now_v7(),
        name: "Seminar Teknologi Informasi".to_owned(),
        organizer: "Himpunan Mahasiswa Informatika".to_owned(),
        start_time: Utc.with_ymd_and_hms(2025, 8, 12, 9, 0, 0).unwrap(),
        certificate_enabled: true,
        certificate_template_id: None,
        room_id: None,
        created_at: Utc::now(),
    }
}

fn registration_row(event_id: Uuid) -> registrations::Model {
    registrations::Model { id: Uuid::now_v7(), event_id, created_at: Utc::now() }
}

fn attendee_row(registration_id: Uuid) -> attendees::Model {
    attendees::Model {
        id: Uuid::now_v7(),
        registration_id,
        name: "Siti Rahma".to_owned(),
        phone: "+62-811-0000".to_owned(),
        checkin_secret: "attendee-checkin-secret".to_owned(),
        attended_at: None,
        cancelled_at: None,
        created_at: Utc::now(),
    }
}

/// Seeds the attendee -> registration -> event chain in the order
/// `find_context` selects it. Room and template are unset, so no further
/// queries follow.
fn attendee_chain_db() -> (attendees::Model, DatabaseConnection) {
    let event = event_row();
    let registration = registration_row(event.id);
    let attendee = attendee_row(registration.id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![attendee.clone()]])
        .append_query_results([vec![registration]])
        .append_query_results([vec![event]])
        .into_connection();

    (attendee, db)
}

// ── State ────────────────────────────────────────────────────────────────────

#[test]
fn should_share_one_connection_across_repositories() {
    let state = test_state(queryless_db());

    let _attendees = state.attendee_repo();
    let _certificates = state.certificate_repo();

    // Three handles on one pool: the state itself plus one per repository.
    // The connection is not clonable under the mock feature, so the repos
    // must hold it through the shared pointer.
    assert_eq!(Arc::strong_count(&state.db), 3);
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_healthz() {
    let server = test_server(queryless_db());

    let res = server.get("/healthz").await;

    assert_eq!(res.status_code(), StatusCode::OK);
}

// ── GET /certificates/{certificate_id}/verify ────────────────────────────────

#[tokio::test]
async fn should_reject_verification_without_signature() {
    let server = test_server(queryless_db());

    let res = server
        .get(&format!("/certificates/{}/verify", Uuid::now_v7()))
        .await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json();
    assert_eq!(body["kind"], "MISSING_SIGNATURE");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_certificate() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<certificates::Model>::new()])
        .into_connection();
    let server = test_server(db);

    let res = server
        .get(&format!("/certificates/{}/verify", Uuid::now_v7()))
        .add_query_param("sig", "deadbeef")
        .await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json();
    assert_eq!(body["kind"], "CERTIFICATE_NOT_FOUND");
}

#[tokio::test]
async fn should_verify_certificate_end_to_end() {
    let event = event_row();
    let registration = registration_row(event.id);
    let attendee = attendee_row(registration.id);

    let issued_at = Utc.with_ymd_and_hms(2025, 8, 12, 9, 0, 0).unwrap();
    let certificate = certificates::Model {
        id: Uuid::now_v7(),
        attendee_id: attendee.id,
        number: "001/E-SERT/ITEBA/VIII/2025".to_owned(),
        file_key: Some("certificates/001-E-SERT-ITEBA-VIII-2025.pdf".to_owned()),
        status: "valid".to_owned(),
        issued_at,
        created_at: issued_at,
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![certificate.clone()]])
        .append_query_results([vec![attendee]])
        .append_query_results([vec![registration]])
        .append_query_results([vec![event]])
        .into_connection();
    let server = test_server(db);

    let sig = test_signer().sign(certificate.id, issued_at);
    let res = server
        .get(&format!("/certificates/{}/verify", certificate.id))
        .add_query_param("sig", &sig)
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);

    let body: serde_json::Value = res.json();
    assert_eq!(body["certificate"]["number"], "001/E-SERT/ITEBA/VIII/2025");
    assert_eq!(body["certificate"]["status"], "valid");
    assert_eq!(body["certificate"]["issued_at"], "2025-08-12T09:00:00.000Z");
    assert_eq!(body["certificate"]["short_hash"], short_hash(certificate.id).as_str());
    assert_eq!(body["attendee"]["name"], "Siti Rahma");
    assert_eq!(body["event"]["name"], "Seminar Teknologi Informasi");
    assert_eq!(body["event"]["organizer"], "Himpunan Mahasiswa Informatika");
    assert_eq!(body["event"]["start_time"], "2025-08-12T09:00:00.000Z");
}

// ── POST /attendees/{attendee_id}/certificate ────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_unknown_attendee() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<attendees::Model>::new()])
        .into_connection();
    let server = test_server(db);

    let res = server
        .post(&format!("/attendees/{}/certificate", Uuid::now_v7()))
        .await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json();
    assert_eq!(body["kind"], "ATTENDEE_NOT_FOUND");
}

#[tokio::test]
async fn should_reject_malformed_attendee_id() {
    let server = test_server(queryless_db());

    let res = server.get("/attendees/not-a-uuid/check-in-token").await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}

// ── Check-in routes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_invalid_checkin_token_over_http() {
    let (attendee, db) = attendee_chain_db();
    let server = test_server(db);

    let res = server
        .post(&format!("/attendees/{}/check-in", attendee.id))
        .json(&serde_json::json!({ "token": "not-a-valid-token" }))
        .await;

    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = res.json();
    assert_eq!(body["kind"], "INVALID_CHECKIN_TOKEN");
}

#[tokio::test]
async fn should_mint_checkin_token_over_http() {
    let (attendee, db) = attendee_chain_db();
    let server = test_server(db);

    let before = Utc::now();
    let res = server
        .get(&format!("/attendees/{}/check-in-token", attendee.id))
        .await;

    assert_eq!(res.status_code(), StatusCode::OK);

    let body: serde_json::Value = res.json();
    let token = body["token"].as_str().unwrap();

    // The minted token must scan; the skew allowance covers a window
    // rotation between request and assertion.
    assert!(verify_checkin_token(
        attendee.checkin_secret.as_bytes(),
        attendee.id,
        token,
        Utc::now(),
    ));

    let expires_at = chrono::DateTime::parse_from_rfc3339(body["expires_at"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert!(expires_at > before);
}
