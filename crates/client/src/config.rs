use std::path::PathBuf;
use std::time::Duration;

use labelhub_core::validation::DEFAULT_MIN_PASSWORD_LENGTH;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server, without the `/api/v1` prefix.
    pub api_url: String,
    /// Directory holding the persisted session record.
    pub session_dir: PathBuf,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Minimum password length checked before sign-up reaches the provider.
    pub min_password_length: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `LABELHUB_API_URL`              | `http://localhost:3000` |
    /// | `LABELHUB_SESSION_DIR`          | `./.labelhub`           |
    /// | `LABELHUB_REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `MIN_PASSWORD_LENGTH`           | `8`                     |
    pub fn from_env() -> Self {
        let api_url = std::env::var("LABELHUB_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let session_dir = std::env::var("LABELHUB_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.labelhub"));

        let request_timeout_secs: u64 = std::env::var("LABELHUB_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("LABELHUB_REQUEST_TIMEOUT_SECS must be a valid u64");

        let min_password_length: usize = std::env::var("MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| DEFAULT_MIN_PASSWORD_LENGTH.to_string())
            .parse()
            .expect("MIN_PASSWORD_LENGTH must be a valid usize");

        Self {
            api_url,
            session_dir,
            request_timeout_secs,
            min_password_length,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
