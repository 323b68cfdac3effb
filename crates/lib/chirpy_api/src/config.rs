//! API server configuration.

use std::path::PathBuf;

use chirpy_core::config::AuthConfig;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:8080").
    pub bind_addr: String,
    /// Directory served under `/app/`.
    pub filepath_root: PathBuf,
    /// Secrets and deployment mode for the auth subsystem.
    pub auth: AuthConfig,
}
