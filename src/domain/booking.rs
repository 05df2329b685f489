//! Booking payloads as emitted by the language model.
//!
//! Models frequently answer with Python-style dict literals
//! (`{'time': '...', 'summary': '...'}`), so the raw text goes through a
//! quote-normalization pass before it is held to a strict grammar: a JSON
//! object with exactly two string fields, `time` and `summary`.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("booking input is empty")]
    Empty,

    #[error("booking input must be an object with string fields 'time' and 'summary': {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A booking request after normalization and trimming.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookingRequest {
    /// ISO-8601 start time, not yet parsed.
    pub time: String,
    /// Event title.
    pub summary: String,
}

impl BookingRequest {
    /// Normalize single quotes, parse strictly, then trim both fields.
    pub fn parse_lenient(raw: &str) -> Result<Self, PayloadError> {
        let normalized = normalize_quotes(raw);
        if normalized.is_empty() {
            return Err(PayloadError::Empty);
        }

        let parsed: BookingRequest = serde_json::from_str(&normalized)?;

        Ok(Self {
            time: parsed.time.trim().to_string(),
            summary: parsed.summary.trim().to_string(),
        })
    }
}

/// Replace every single quote with a double quote.
///
/// Apostrophes inside values are replaced too, which breaks payloads such as
/// `{'summary': 'Sam's review'}`; those fail the strict parse.
pub fn normalize_quotes(raw: &str) -> String {
    raw.trim().replace('\'', "\"")
}
