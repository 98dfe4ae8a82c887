#![allow(async_fn_in_trait)]

use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Attendee, AttendeeContext, Certificate, CertificateDraft, CertificateRenderData,
    VerificationRecord,
};

/// Number allocation failure. Exhaustion is its own variant so callers can
/// surface it as an alertable error instead of a generic 500.
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("certificate number sequence exhausted")]
    Exhausted,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub trait AttendeeRepository: Send + Sync {
    /// Load an attendee together with its registration, event and template
    /// rows. `None` when the attendee does not exist.
    async fn find_context(&self, attendee_id: Uuid) -> anyhow::Result<Option<AttendeeContext>>;

    async fn mark_attended(
        &self,
        attendee_id: Uuid,
        attended_at: DateTime<Utc>,
    ) -> anyhow::Result<Attendee>;
}

pub trait CertificateRepository: Send + Sync {
    /// The attendee's current non-revoked certificate, if any.
    async fn find_valid_by_attendee(&self, attendee_id: Uuid)
    -> anyhow::Result<Option<Certificate>>;

    async fn find_for_verification(
        &self,
        certificate_id: Uuid,
    ) -> anyhow::Result<Option<VerificationRecord>>;

    /// Allocate the next sequence for the draft's issuance year and persist
    /// the certificate under the formatted number, atomically. If a valid
    /// certificate for the draft's attendee already exists by the time the
    /// allocation lock is held, that certificate is returned instead.
    async fn create_numbered(&self, draft: CertificateDraft)
    -> Result<Certificate, AllocationError>;

    async fn set_file_key(&self, certificate_id: Uuid, file_key: &str) -> anyhow::Result<()>;
}

pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes) -> anyhow::Result<()>;

    /// `None` when the key has no stored object.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
}

/// PDF composition is CPU-bound and touches no I/O besides the logo file,
/// so the port stays synchronous.
pub trait CertificateRenderer: Send + Sync {
    fn render(&self, data: &CertificateRenderData) -> anyhow::Result<Vec<u8>>;
}
