//! Chirp body validation and cleanup.

use crate::error::{AppError, AppResult};

/// Maximum chirp length, in characters.
pub const MAX_CHIRP_LEN: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const CENSORED: &str = "****";

/// Validate a chirp body and return it with profanity masked.
pub fn prepare_body(body: &str) -> AppResult<String> {
    if body.chars().count() > MAX_CHIRP_LEN {
        return Err(AppError::Validation("Chirp is too long".into()));
    }
    Ok(censor(body))
}

/// Replace whole space-separated profane words, ignoring case.
fn censor(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if PROFANE_WORDS.contains(&word.to_lowercase().as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
