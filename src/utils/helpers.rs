//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::utils::errors::{EventHubError, Result};

/// Parse a path identifier, treating malformed ids as missing resources
pub fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| EventHubError::not_found(resource, raw))
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Lowercase and trim an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Require a non-blank string field, returning it trimmed
pub fn require_field(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| normalize_whitespace(&v)) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(EventHubError::InvalidInput(format!("{} is required", field))),
    }
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Treat empty strings and "all" as an absent filter
pub fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Generate a random hex token of `bytes` random bytes
pub fn generate_token(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..bytes)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}

/// SHA-256 hex digest of a token, used so raw reset tokens are never stored
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
