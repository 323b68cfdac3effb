//! Password hashing via bcrypt.

use std::sync::LazyLock;

use tracing::debug;

use super::AuthError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
///
/// Empty passwords are hashed like any other; rejecting them is a policy
/// decision for the caller.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// Returns `false` for a wrong password and for a hash bcrypt cannot parse.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            debug!(error = %e, "bcrypt verify rejected stored hash");
            false
        }
    }
}

/// Throwaway hash at the login cost factor. `None` only if bcrypt cannot
/// hash at all, in which case real verifies fail too.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: LazyLock<Option<String>> =
        LazyLock::new(|| bcrypt::hash("chirpy-unknown-account", BCRYPT_COST).ok());
    DUMMY_HASH.as_deref()
}

/// Spend one full bcrypt verify on a login whose account does not exist, so
/// it takes as long as a wrong password for a real account.
pub fn burn_verify(password: &str) {
    if let Some(hash) = dummy_hash() {
        let _ = bcrypt::verify(password, hash);
    }
}
