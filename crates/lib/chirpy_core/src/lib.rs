//! # chirpy_core
//!
//! Core domain logic for Chirpy: the authentication and session token
//! subsystem, domain models, and the storage backends behind them.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod store;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
