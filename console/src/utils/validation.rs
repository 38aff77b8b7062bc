//! Input validation for console records

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

// E.164: optional '+', no leading zero, at most 15 digits
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Strip the punctuation people type into phone numbers: spaces, dashes, dots, parens
pub fn normalize_phone_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

/// Accept an E.164-style number, tolerating common punctuation
pub fn validate_phone_number(number: &str) -> Result<(), String> {
    if number.trim().is_empty() {
        return Err("Phone number is required".to_string());
    }
    if PHONE_REGEX.is_match(&normalize_phone_number(number)) {
        Ok(())
    } else {
        Err(format!("Invalid phone number: {number}"))
    }
}
