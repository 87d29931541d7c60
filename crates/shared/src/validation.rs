//! Common validation utilities.
//!
//! These are used as `#[validate(custom(function = "..."))]` hooks on the
//! request DTOs in the domain crate.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// 24-hour `HH:MM` clock time.
    static ref TIME_HHMM_REGEX: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
    /// Phone numbers: optional leading `+`, digits, spaces, dashes and parentheses.
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9 ()\-]{8,20}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a `HH:MM` 24-hour time string.
pub fn validate_time_hhmm(value: &str) -> Result<(), ValidationError> {
    if TIME_HHMM_REGEX.is_match(value) {
        Ok(())
    } else {
        Err(error("time_format", "Time must be in HH:MM format"))
    }
}

/// Validates a phone number's shape (not its existence).
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if PHONE_REGEX.is_match(value) && (8..=15).contains(&digits) {
        Ok(())
    } else {
        Err(error("phone_format", "Phone number is invalid"))
    }
}

/// Rejects strings that are empty after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}

/// Validates a Brazilian CPF (taxpayer id), with or without punctuation.
///
/// Checks length, rejects repeated-digit sequences and verifies both check
/// digits.
pub fn validate_cpf(value: &str) -> Result<(), ValidationError> {
    let invalid = || error("cpf_invalid", "CPF is invalid");

    if value
        .chars()
        .any(|c| !(c.is_ascii_digit() || c == '.' || c == '-'))
    {
        return Err(invalid());
    }

    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid());
    }

    let check = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rem = (sum * 10) % 11;
        if rem == 10 {
            0
        } else {
            rem
        }
    };

    if check(9) == digits[9] && check(10) == digits[10] {
        Ok(())
    } else {
        Err(invalid())
    }
}
