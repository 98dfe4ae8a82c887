use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use uuid::Uuid;

use acara_certificates::domain::number::format_number;
use acara_certificates::domain::repository::{
    AllocationError, ArtifactStore, AttendeeRepository, CertificateRenderer,
    CertificateRepository,
};
use acara_certificates::domain::types::{
    Attendee, AttendeeContext, Certificate, CertificateDraft, CertificateRenderData,
    CertificateStatus, EventSummary, MAX_SEQUENCE_ATTEMPTS, VerificationRecord,
};
use acara_certificates::usecase::sign::LinkSigner;

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-for-tests-only";
pub const TEST_BASE_URL: &str = "https://acara.test";

pub fn test_signer() -> LinkSigner {
    LinkSigner::new(TEST_SIGNING_SECRET.as_bytes(), TEST_BASE_URL)
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_context() -> AttendeeContext {
    let start_time = Utc.with_ymd_and_hms(2025, 8, 12, 9, 0, 0).unwrap();

    AttendeeContext {
        attendee: Attendee {
            id: Uuid::now_v7(),
            name: "Siti Rahma".to_owned(),
            phone: "+62-811-0000".to_owned(),
            checkin_secret: "attendee-checkin-secret".to_owned(),
            attended_at: Some(start_time),
            cancelled_at: None,
        },
        event: EventSummary {
            id: Uuid::now_v7(),
            name: "Seminar Teknologi Informasi".to_owned(),
            organizer: "Himpunan Mahasiswa Informatika".to_owned(),
            start_time,
            certificate_enabled: true,
            venue: Some("Aula Utama".to_owned()),
            template: None,
        },
    }
}

/// Certificate issued "now" so it lands in the same allocation year as the
/// certificates the tests issue.
pub fn test_certificate(attendee_id: Uuid, seq: u32) -> Certificate {
    let issued_at = Utc::now();
    let number = format_number(seq, issued_at);

    Certificate {
        id: Uuid::new_v4(),
        attendee_id,
        number,
        file_key: None,
        status: CertificateStatus::Valid,
        issued_at,
        created_at: issued_at,
    }
}

// ── MockAttendeeRepo ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockAttendeeRepo {
    pub contexts: Vec<AttendeeContext>,
    pub attended: Arc<Mutex<Vec<(Uuid, DateTime<Utc>)>>>,
}

impl MockAttendeeRepo {
    pub fn new(contexts: Vec<AttendeeContext>) -> Self {
        Self { contexts, attended: Arc::new(Mutex::new(vec![])) }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the recorded `mark_attended` calls.
    pub fn attended_handle(&self) -> Arc<Mutex<Vec<(Uuid, DateTime<Utc>)>>> {
        Arc::clone(&self.attended)
    }
}

impl AttendeeRepository for MockAttendeeRepo {
    async fn find_context(&self, attendee_id: Uuid) -> anyhow::Result<Option<AttendeeContext>> {
        Ok(self.contexts.iter().find(|c| c.attendee.id == attendee_id).cloned())
    }

    async fn mark_attended(
        &self,
        attendee_id: Uuid,
        attended_at: DateTime<Utc>,
    ) -> anyhow::Result<Attendee> {
        self.attended.lock().unwrap().push((attendee_id, attended_at));

        let ctx = self
            .contexts
            .iter()
            .find(|c| c.attendee.id == attendee_id)
            .ok_or_else(|| anyhow::anyhow!("unknown attendee {attendee_id}"))?;

        Ok(Attendee { attended_at: Some(attended_at), ..ctx.attendee.clone() })
    }
}

// ── MockCertificateRepo ──────────────────────────────────────────────────────

/// In-memory certificate store mirroring the allocator contract: allocation
/// is atomic (the mutex stands in for the database year lock), counts are
/// per calendar year, taken numbers are probed past, and an attendee who
/// already holds a valid certificate gets it back instead of a second one.
#[derive(Clone)]
pub struct MockCertificateRepo {
    pub certificates: Arc<Mutex<Vec<Certificate>>>,
}

impl MockCertificateRepo {
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates: Arc::new(Mutex::new(certificates)) }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the stored certificates for post-execution inspection.
    pub fn certificates_handle(&self) -> Arc<Mutex<Vec<Certificate>>> {
        Arc::clone(&self.certificates)
    }
}

impl CertificateRepository for MockCertificateRepo {
    async fn find_valid_by_attendee(
        &self,
        attendee_id: Uuid,
    ) -> anyhow::Result<Option<Certificate>> {
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.attendee_id == attendee_id && c.status == CertificateStatus::Valid)
            .cloned())
    }

    async fn find_for_verification(
        &self,
        certificate_id: Uuid,
    ) -> anyhow::Result<Option<VerificationRecord>> {
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == certificate_id)
            .map(|c| VerificationRecord {
                certificate: c.clone(),
                attendee_name: "Siti Rahma".to_owned(),
                event_name: "Seminar Teknologi Informasi".to_owned(),
                event_start_time: c.issued_at,
                event_organizer: "Himpunan Mahasiswa Informatika".to_owned(),
            }))
    }

    async fn create_numbered(
        &self,
        draft: CertificateDraft,
    ) -> Result<Certificate, AllocationError> {
        let mut certificates = self.certificates.lock().unwrap();

        if let Some(existing) = certificates
            .iter()
            .find(|c| c.attendee_id == draft.attendee_id && c.status == CertificateStatus::Valid)
        {
            return Ok(existing.clone());
        }

        let year = draft.issued_at.year();
        let count =
            certificates.iter().filter(|c| c.issued_at.year() == year).count() as u32;

        let mut seq = count + 1;
        for _ in 0..MAX_SEQUENCE_ATTEMPTS {
            let number = format_number(seq, draft.issued_at);

            if !certificates.iter().any(|c| c.number == number) {
                let certificate = Certificate {
                    id: draft.id,
                    attendee_id: draft.attendee_id,
                    number,
                    file_key: None,
                    status: CertificateStatus::Valid,
                    issued_at: draft.issued_at,
                    created_at: draft.issued_at,
                };
                certificates.push(certificate.clone());
                return Ok(certificate);
            }

            seq += 1;
        }

        Err(AllocationError::Exhausted)
    }

    async fn set_file_key(&self, certificate_id: Uuid, file_key: &str) -> anyhow::Result<()> {
        let mut certificates = self.certificates.lock().unwrap();
        let certificate = certificates
            .iter_mut()
            .find(|c| c.id == certificate_id)
            .ok_or_else(|| anyhow::anyhow!("unknown certificate {certificate_id}"))?;

        certificate.file_key = Some(file_key.to_owned());
        Ok(())
    }
}

// ── MockArtifactStore ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockArtifactStore {
    pub objects: Arc<Mutex<HashMap<String, Bytes>>>,
    pub puts: Arc<Mutex<Vec<String>>>,
}

impl MockArtifactStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Shared handle to the stored objects, e.g. to simulate storage loss.
    pub fn objects_handle(&self) -> Arc<Mutex<HashMap<String, Bytes>>> {
        Arc::clone(&self.objects)
    }

    /// Shared handle to the log of written keys.
    pub fn puts_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.puts)
    }
}

impl ArtifactStore for MockArtifactStore {
    async fn put(&self, key: &str, bytes: Bytes) -> anyhow::Result<()> {
        self.objects.lock().unwrap().insert(key.to_owned(), bytes);
        self.puts.lock().unwrap().push(key.to_owned());
        Ok(())
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }
}

// ── Renderers ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockRenderer {
    pub renders: Arc<Mutex<Vec<String>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self { renders: Arc::new(Mutex::new(vec![])) }
    }

    /// Shared handle to the certificate numbers rendered so far.
    pub fn renders_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.renders)
    }
}

impl CertificateRenderer for MockRenderer {
    fn render(&self, data: &CertificateRenderData) -> anyhow::Result<Vec<u8>> {
        self.renders.lock().unwrap().push(data.certificate_number.clone());
        Ok(b"%PDF-1.4 mock".to_vec())
    }
}

pub struct FailingRenderer;

impl CertificateRenderer for FailingRenderer {
    fn render(&self, _data: &CertificateRenderData) -> anyhow::Result<Vec<u8>> {
        Err(anyhow::anyhow!("renderer exploded"))
    }
}
