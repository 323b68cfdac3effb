//! Domain models shared by the storage backends and the API layer.

pub mod auth;
pub mod chirp;
