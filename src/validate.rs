//! Sanitizing and validation of user-entered lead fields.
//!
//! Everything here is pure: no I/O, no shared state.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::LeadInput;

pub const MAX_INPUT_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_PHONE_LEN: usize = 20;
pub const MAX_SOCIAL_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zА-Яа-яЁё \-']{1,50}$").unwrap());

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").unwrap());

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Field name -> message for every field that failed validation.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Trim, drop markup/quote characters and cap the length.
///
/// The trailing trim makes the output a fixed point, so applying this twice
/// gives the same result as applying it once.
pub fn sanitize(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '`'))
        .take(MAX_INPUT_LEN)
        .collect();
    stripped.trim().to_string()
}

pub fn validate_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Drop the formatting characters people type into phone numbers.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-'))
        .collect()
}

pub fn validate_phone(phone: &str) -> bool {
    let normalized = normalize_phone(phone);
    let len = normalized.chars().count();
    PHONE_RE.is_match(&normalized) && (10..=16).contains(&len)
}

pub fn validate_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN && EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn validate_social(social: &str) -> bool {
    social.chars().count() <= MAX_SOCIAL_LEN
}

pub fn name_error(name: &str) -> Option<String> {
    if name.is_empty() {
        Some("Name is required".to_string())
    } else if !validate_name(name) {
        Some(format!(
            "Name may contain only letters, spaces, hyphens and apostrophes (up to {MAX_NAME_LEN})"
        ))
    } else {
        None
    }
}

pub fn phone_error(phone: &str) -> Option<String> {
    if phone.is_empty() {
        Some("Phone is required".to_string())
    } else if normalize_phone(phone).chars().count() > MAX_PHONE_LEN || !validate_phone(phone) {
        Some("Enter a phone number with 10 to 16 digits, e.g. +7 999 123-45-67".to_string())
    } else {
        None
    }
}

pub fn social_error(social: &str) -> Option<String> {
    if validate_social(social) {
        None
    } else {
        Some(format!("Social handle must be at most {MAX_SOCIAL_LEN} characters"))
    }
}

/// Validate every field of an already sanitized lead.
pub fn validate_lead(input: &LeadInput) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(e) = name_error(&input.name) {
        errors.insert("name", e);
    }
    if let Some(e) = phone_error(&input.phone) {
        errors.insert("phone", e);
    }
    if let Some(e) = social_error(&input.social) {
        errors.insert("social", e);
    }
    errors
}
