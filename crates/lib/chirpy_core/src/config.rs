//! Authentication configuration.
//!
//! Built once at startup and handed to the API state; nothing in the auth
//! subsystem reads process environment on its own.

use std::fmt;

/// Deployment mode that unlocks admin-only operations.
pub const DEV_PLATFORM: &str = "dev";

/// What `/api/refresh` does with the refresh token it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationPolicy {
    /// Keep using the same refresh token until it expires or is revoked.
    #[default]
    Reuse,
    /// Revoke the presented token and hand out a new one on every refresh.
    Rotate,
}

/// Secrets and switches consumed by the auth subsystem.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Shared secret expected from the Polka payment webhook.
    pub polka_key: String,
    /// Deployment mode, e.g. `dev` or `prod`.
    pub platform: String,
    pub rotation: RotationPolicy,
}

impl AuthConfig {
    /// Whether the deployment mode allows admin-only operations.
    pub fn is_dev(&self) -> bool {
        self.platform == DEV_PLATFORM
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("polka_key", &"<redacted>")
            .field("platform", &self.platform)
            .field("rotation", &self.rotation)
            .finish()
    }
}
