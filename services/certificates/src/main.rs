use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use acara_certificates::config::CertificatesConfig;
use acara_certificates::router::build_router;
use acara_certificates::state::AppState;
use acara_certificates::usecase::sign::LinkSigner;

#[tokio::main]
async fn main() {
    acara_core::tracing::init_tracing();

    let config = CertificatesConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db: Arc::new(db),
        signer: LinkSigner::new(config.signing_secret, config.public_base_url),
        logo_path: config.logo_path,
        storage_root: config.storage_root,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.certificates_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("certificates service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
