use chrono::Duration;

use acara_certificates::domain::types::CertificateStatus;
use acara_certificates::error::CertificatesServiceError;
use acara_certificates::usecase::sign::short_hash;
use acara_certificates::usecase::verify::VerifyCertificateUseCase;

use crate::helpers::{MockCertificateRepo, test_certificate, test_signer};

fn usecase(repo: MockCertificateRepo) -> VerifyCertificateUseCase<MockCertificateRepo> {
    VerifyCertificateUseCase {
        certificate_repo: repo,
        signer: test_signer(),
    }
}

/// Flips one hex digit so the signature is well-formed but wrong.
fn tamper(sig: &str) -> String {
    let replacement = if sig.starts_with('0') { "1" } else { "0" };
    format!("{replacement}{}", &sig[1..])
}

#[tokio::test]
async fn should_verify_valid_certificate() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let sig = test_signer().sign(certificate.id, certificate.issued_at);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let details = usecase.execute(certificate.id, Some(sig)).await.unwrap();

    assert_eq!(details.record.certificate, certificate);
    assert_eq!(details.record.attendee_name, "Siti Rahma");
    assert_eq!(details.record.event_name, "Seminar Teknologi Informasi");
    assert_eq!(details.record.event_organizer, "Himpunan Mahasiswa Informatika");
    assert_eq!(details.short_hash, short_hash(certificate.id));
}

#[tokio::test]
async fn should_require_signature() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let result = usecase.execute(certificate.id, None).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::MissingSignature)),
        "expected MissingSignature, got {result:?}"
    );
}

#[tokio::test]
async fn should_treat_blank_signature_as_missing() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let result = usecase.execute(certificate.id, Some(String::new())).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::MissingSignature)),
        "expected MissingSignature, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_unknown_certificate() {
    let unknown = uuid::Uuid::now_v7();
    let sig = test_signer().sign(unknown, chrono::Utc::now());
    let usecase = usecase(MockCertificateRepo::empty());

    let result = usecase.execute(unknown, Some(sig)).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::CertificateNotFound)),
        "expected CertificateNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_revoked_even_with_valid_signature() {
    let mut certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    certificate.status = CertificateStatus::Revoked;
    let sig = test_signer().sign(certificate.id, certificate.issued_at);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let result = usecase.execute(certificate.id, Some(sig)).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::CertificateRevoked)),
        "expected CertificateRevoked, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_revoked_before_checking_signature() {
    let mut certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    certificate.status = CertificateStatus::Revoked;
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    // Garbage signature: revocation must still win over signature checks.
    let result = usecase
        .execute(certificate.id, Some("not-a-signature".into()))
        .await;

    assert!(
        matches!(result, Err(CertificatesServiceError::CertificateRevoked)),
        "expected CertificateRevoked, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_tampered_signature() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let sig = tamper(&test_signer().sign(certificate.id, certificate.issued_at));
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let result = usecase.execute(certificate.id, Some(sig)).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::InvalidSignature)),
        "expected InvalidSignature, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_malformed_signature() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    for sig in ["0000", "zzzz-not-hex", "deadbeef"] {
        let result = usecase.execute(certificate.id, Some(sig.into())).await;

        assert!(
            matches!(result, Err(CertificatesServiceError::InvalidSignature)),
            "expected InvalidSignature for {sig:?}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn should_reject_signature_of_another_certificate() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let other = test_certificate(uuid::Uuid::now_v7(), 2);
    let sig = test_signer().sign(other.id, other.issued_at);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone(), other]));

    let result = usecase.execute(certificate.id, Some(sig)).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::InvalidSignature)),
        "expected InvalidSignature, got {result:?}"
    );
}

#[tokio::test]
async fn should_bind_signature_to_issuance_time() {
    let certificate = test_certificate(uuid::Uuid::now_v7(), 1);
    let shifted = certificate.issued_at + Duration::seconds(1);
    let sig = test_signer().sign(certificate.id, shifted);
    let usecase = usecase(MockCertificateRepo::new(vec![certificate.clone()]));

    let result = usecase.execute(certificate.id, Some(sig)).await;

    assert!(
        matches!(result, Err(CertificatesServiceError::InvalidSignature)),
        "expected InvalidSignature, got {result:?}"
    );
}
