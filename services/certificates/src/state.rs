use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{DbAttendeeRepository, DbCertificateRepository};
use crate::infra::storage::FsArtifactStore;
use crate::render::pdf::PdfRenderer;
use crate::usecase::issue::IssueCertificateUseCase;
use crate::usecase::sign::LinkSigner;

/// Shared application state passed to every handler via axum `State`.
///
/// The connection lives behind an `Arc` so the repositories share one pool
/// handle; `DatabaseConnection` itself is not `Clone` when sea-orm's `mock`
/// feature is enabled.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub signer: LinkSigner,
    pub logo_path: PathBuf,
    pub storage_root: PathBuf,
}

impl AppState {
    pub fn attendee_repo(&self) -> DbAttendeeRepository {
        DbAttendeeRepository { db: Arc::clone(&self.db) }
    }

    pub fn certificate_repo(&self) -> DbCertificateRepository {
        DbCertificateRepository { db: Arc::clone(&self.db) }
    }

    pub fn artifact_store(&self) -> FsArtifactStore {
        FsArtifactStore::new(self.storage_root.clone())
    }

    pub fn renderer(&self) -> PdfRenderer {
        PdfRenderer::new(self.logo_path.clone())
    }

    pub fn issue_usecase(
        &self,
    ) -> IssueCertificateUseCase<
        DbAttendeeRepository,
        DbCertificateRepository,
        FsArtifactStore,
        PdfRenderer,
    > {
        IssueCertificateUseCase {
            attendee_repo: self.attendee_repo(),
            certificate_repo: self.certificate_repo(),
            artifact_store: self.artifact_store(),
            renderer: self.renderer(),
            signer: self.signer.clone(),
        }
    }
}
