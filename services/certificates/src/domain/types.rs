use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Candidate numbers probed under the year lock before allocation gives up.
pub const MAX_SEQUENCE_ATTEMPTS: u32 = 10;

/// Seconds per rolling check-in token window.
pub const CHECKIN_TOKEN_STEP_SECS: i64 = 60;

/// Windows accepted on either side of "now", for scanner clock skew.
pub const CHECKIN_TOKEN_SKEW_WINDOWS: i64 = 1;

/// Lifecycle of an issued certificate. Revocation happens through an
/// administrative action outside this service; the verifier honors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Revoked,
}

impl CertificateStatus {
    pub fn is_revoked(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Revoked => "revoked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "valid" => Some(Self::Valid),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }
}

/// Issued certificate. `id` is the unguessable public identifier used in
/// verification URLs; `number` is the human-facing sequential number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub number: String,
    pub file_key: Option<String>,
    pub status: CertificateStatus,
    pub issued_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Certificate awaiting number allocation. The public identifier is fixed
/// here, before the record exists, so a retried allocation never changes it.
#[derive(Debug, Clone)]
pub struct CertificateDraft {
    pub id: Uuid,
    pub attendee_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

impl CertificateDraft {
    pub fn new(attendee_id: Uuid, issued_at: DateTime<Utc>) -> Self {
        Self {
            // v4: verification URLs must not be guessable or orderable.
            id: Uuid::new_v4(),
            attendee_id,
            issued_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub checkin_secret: String,
    pub attended_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// Template theme plus its free-form config overrides.
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub theme: String,
    pub config: Map<String, Value>,
}

impl Default for TemplateInfo {
    fn default() -> Self {
        Self {
            theme: "classic".to_owned(),
            config: Map::new(),
        }
    }
}

/// Event fields the certificate flows read. `venue` is the room name when
/// the event has one; `template` is None when no template is attached.
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub organizer: String,
    pub start_time: DateTime<Utc>,
    pub certificate_enabled: bool,
    pub venue: Option<String>,
    pub template: Option<TemplateInfo>,
}

/// Attendee joined with the event reached through its registration.
#[derive(Debug, Clone)]
pub struct AttendeeContext {
    pub attendee: Attendee,
    pub event: EventSummary,
}

/// Certificate joined with the attendee and event fields the public
/// verifier reports.
#[derive(Debug, Clone)]
pub struct VerificationRecord {
    pub certificate: Certificate,
    pub attendee_name: String,
    pub event_name: String,
    pub event_start_time: DateTime<Utc>,
    pub event_organizer: String,
}

/// Read-only projection handed to the renderer. Assembled once by the
/// issuance flow; rendering never reaches back into repositories.
#[derive(Debug, Clone)]
pub struct CertificateRenderData {
    pub certificate_number: String,
    pub attendee_name: String,
    pub event_name: String,
    pub event_organizer: String,
    pub event_date: DateTime<Utc>,
    pub venue: String,
    pub theme: String,
    pub config: Map<String, Value>,
    pub verification_url: String,
    pub short_hash: String,
}
