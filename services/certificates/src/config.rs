use std::path::PathBuf;

/// Certificates service configuration loaded from environment variables.
#[derive(Debug)]
pub struct CertificatesConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing certificate verification links. Rotating it
    /// invalidates every link printed on previously issued certificates.
    pub signing_secret: String,
    /// Public base URL embedded in verification links
    /// (e.g. "https://acara.example.ac.id").
    pub public_base_url: String,
    /// Filesystem path of the institution logo embedded in certificates.
    /// Env var: `CERTIFICATE_LOGO_PATH`.
    pub logo_path: PathBuf,
    /// Root directory for stored certificate PDFs. Env var: `STORAGE_ROOT`.
    pub storage_root: PathBuf,
    /// TCP port to listen on (default 3114). Env var: `CERTIFICATES_PORT`.
    pub certificates_port: u16,
}

impl CertificatesConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            signing_secret: std::env::var("SIGNING_SECRET").expect("SIGNING_SECRET"),
            public_base_url: std::env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL"),
            logo_path: std::env::var("CERTIFICATE_LOGO_PATH")
                .unwrap_or_else(|_| "assets/logo.png".to_owned())
                .into(),
            storage_root: std::env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "storage".to_owned())
                .into(),
            certificates_port: std::env::var("CERTIFICATES_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
        }
    }
}
