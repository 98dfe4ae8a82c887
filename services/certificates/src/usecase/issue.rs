use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::number::artifact_key;
use crate::domain::repository::{
    AllocationError, ArtifactStore, AttendeeRepository, CertificateRenderer,
    CertificateRepository,
};
use crate::domain::types::{
    AttendeeContext, Certificate, CertificateDraft, CertificateRenderData,
};
use crate::error::CertificatesServiceError;
use crate::usecase::sign::{LinkSigner, short_hash};

/// Issues certificates: checks preconditions, allocates the number, renders
/// the PDF, stores the artifact. Re-running for the same attendee returns the
/// existing certificate without touching the allocator or the store.
pub struct IssueCertificateUseCase<
    A: AttendeeRepository,
    C: CertificateRepository,
    S: ArtifactStore,
    R: CertificateRenderer,
> {
    pub attendee_repo: A,
    pub certificate_repo: C,
    pub artifact_store: S,
    pub renderer: R,
    pub signer: LinkSigner,
}

impl<A, C, S, R> IssueCertificateUseCase<A, C, S, R>
where
    A: AttendeeRepository,
    C: CertificateRepository,
    S: ArtifactStore,
    R: CertificateRenderer,
{
    pub async fn execute(
        &self,
        attendee_id: Uuid,
    ) -> Result<Certificate, CertificatesServiceError> {
        // 1. Load the attendee with its registration, event and template.
        let ctx = self
            .attendee_repo
            .find_context(attendee_id)
            .await?
            .ok_or(CertificatesServiceError::AttendeeNotFound)?;

        // 2. The event must have certificates enabled.
        if !ctx.event.certificate_enabled {
            return Err(CertificatesServiceError::CertificatesNotEnabled);
        }

        // 3. Attendance must be confirmed.
        if ctx.attendee.attended_at.is_none() {
            return Err(CertificatesServiceError::AttendanceNotConfirmed);
        }

        // 4. An existing valid certificate is returned as-is. One with no
        //    stored artifact (crash between record and render) is repaired
        //    here; its number and identifier never change.
        if let Some(certificate) =
            self.certificate_repo.find_valid_by_attendee(attendee_id).await?
        {
            if certificate.file_key.is_some() {
                return Ok(certificate);
            }

            let (certificate, _) = self.render_and_store(certificate, &ctx).await?;

            return Ok(certificate);
        }

        // 5. Allocate a number and persist the record before rendering, so a
        //    render crash cannot lose the allocated number.
        let draft = CertificateDraft::new(attendee_id, Utc::now());
        let certificate =
            self.certificate_repo.create_numbered(draft).await.map_err(|e| match e {
                AllocationError::Exhausted => CertificatesServiceError::SequenceExhausted,
                AllocationError::Other(e) => e.into(),
            })?;

        tracing::info!(
            attendee_id = %attendee_id,
            certificate_id = %certificate.id,
            number = %certificate.number,
            "issued certificate"
        );

        // 6. Render and store the artifact.
        let (certificate, _) = self.render_and_store(certificate, &ctx).await?;

        Ok(certificate)
    }

    /// Issue (idempotently) and return the PDF bytes. A stored artifact that
    /// went missing from storage is re-rendered from the persisted record.
    pub async fn download(
        &self,
        attendee_id: Uuid,
    ) -> Result<(Certificate, Bytes), CertificatesServiceError> {
        let certificate = self.execute(attendee_id).await?;

        let key = certificate
            .file_key
            .clone()
            .unwrap_or_else(|| artifact_key(&certificate.number));

        if let Some(bytes) = self.artifact_store.get(&key).await? {
            return Ok((certificate, bytes));
        }

        tracing::warn!(
            certificate_id = %certificate.id,
            key = %key,
            "stored artifact missing, re-rendering"
        );

        let ctx = self
            .attendee_repo
            .find_context(attendee_id)
            .await?
            .ok_or(CertificatesServiceError::AttendeeNotFound)?;

        self.render_and_store(certificate, &ctx).await
    }

    async fn render_and_store(
        &self,
        certificate: Certificate,
        ctx: &AttendeeContext,
    ) -> Result<(Certificate, Bytes), CertificatesServiceError> {
        let data = render_data(&certificate, ctx, &self.signer);
        let bytes = Bytes::from(self.renderer.render(&data)?);

        let key = artifact_key(&certificate.number);
        self.artifact_store.put(&key, bytes.clone()).await?;
        self.certificate_repo.set_file_key(certificate.id, &key).await?;

        Ok((Certificate { file_key: Some(key), ..certificate }, bytes))
    }
}

fn render_data(
    certificate: &Certificate,
    ctx: &AttendeeContext,
    signer: &LinkSigner,
) -> CertificateRenderData {
    let template = ctx.event.template.clone().unwrap_or_default();

    CertificateRenderData {
        certificate_number: certificate.number.clone(),
        attendee_name: ctx.attendee.name.clone(),
        event_name: ctx.event.name.clone(),
        event_organizer: ctx.event.organizer.clone(),
        event_date: ctx.event.start_time,
        venue: ctx.event.venue.clone().unwrap_or_else(|| "-".to_owned()),
        theme: template.theme,
        config: template.config,
        verification_url: signer.verification_url(certificate.id, certificate.issued_at),
        short_hash: short_hash(certificate.id),
    }
}
