use uuid::Uuid;

use crate::domain::repository::CertificateRepository;
use crate::domain::types::VerificationRecord;
use crate::error::CertificatesServiceError;
use crate::usecase::sign::{LinkSigner, short_hash};

/// Everything the public verification response reports.
#[derive(Debug, Clone)]
pub struct VerificationDetails {
    pub record: VerificationRecord,
    pub short_hash: String,
}

pub struct VerifyCertificateUseCase<C: CertificateRepository> {
    pub certificate_repo: C,
    pub signer: LinkSigner,
}

impl<C: CertificateRepository> VerifyCertificateUseCase<C> {
    pub async fn execute(
        &self,
        certificate_id: Uuid,
        sig: Option<String>,
    ) -> Result<VerificationDetails, CertificatesServiceError> {
        // 1. The signature parameter must be present and non-empty.
        let sig = sig
            .filter(|s| !s.is_empty())
            .ok_or(CertificatesServiceError::MissingSignature)?;

        // 2. The certificate must exist.
        let record = self
            .certificate_repo
            .find_for_verification(certificate_id)
            .await?
            .ok_or(CertificatesServiceError::CertificateNotFound)?;

        // 3. Revocation wins over signature validity.
        if record.certificate.status.is_revoked() {
            return Err(CertificatesServiceError::CertificateRevoked);
        }

        // 4. Constant-time MAC check; malformed hex fails like any mismatch.
        if !self.signer.verify(certificate_id, record.certificate.issued_at, &sig) {
            return Err(CertificatesServiceError::InvalidSignature);
        }

        Ok(VerificationDetails { short_hash: short_hash(certificate_id), record })
    }
}
