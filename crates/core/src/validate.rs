//! Field-level rules shared by every record type.
//!
//! These mirror the column options of the storage schema: required text,
//! bounded character columns, slugs, e-mail addresses and bounded integers.

use crate::error::{DomainError, DomainResult};

/// Maximum length of a bounded character column.
pub const CHAR_MAX_LENGTH: usize = 255;

/// Maximum length of an e-mail column.
pub const EMAIL_MAX_LENGTH: usize = 254;

/// Largest value of a positive integer column.
pub const POSITIVE_INT_MAX: u32 = 2_147_483_647;

/// Largest value of a positive small integer column.
pub const POSITIVE_SMALL_INT_MAX: u16 = 32_767;

/// Text must not be blank.
pub fn required(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Text must fit the column (counted in characters, not bytes).
pub fn max_length(field: &str, value: &str, max: usize) -> DomainResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(format!(
            "{field} has {len} characters (max {max})"
        )));
    }
    Ok(())
}

/// Required bounded character column.
pub fn char_field(field: &str, value: &str) -> DomainResult<()> {
    required(field, value)?;
    max_length(field, value, CHAR_MAX_LENGTH)
}

/// Letters, digits, hyphens and underscores only.
pub fn slug(field: &str, value: &str) -> DomainResult<()> {
    char_field(field, value)?;
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(DomainError::validation(format!(
            "{field} contains invalid slug character {bad:?}"
        )));
    }
    Ok(())
}

/// A single `@` with a non-empty local part and a dotted domain.
pub fn email(field: &str, value: &str) -> DomainResult<()> {
    required(field, value)?;
    max_length(field, value, EMAIL_MAX_LENGTH)?;

    let malformed = || DomainError::validation(format!("{field} is not a valid e-mail address"));
    if value.chars().any(char::is_whitespace) {
        return Err(malformed());
    }
    let (local, domain) = value.split_once('@').ok_or_else(malformed)?;
    if local.is_empty() || domain.contains('@') {
        return Err(malformed());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(malformed());
    }
    Ok(())
}

pub fn positive_int(field: &str, value: u32) -> DomainResult<()> {
    if value > POSITIVE_INT_MAX {
        return Err(DomainError::validation(format!(
            "{field} must be at most {POSITIVE_INT_MAX}"
        )));
    }
    Ok(())
}

pub fn positive_small_int(field: &str, value: u16) -> DomainResult<()> {
    if value > POSITIVE_SMALL_INT_MAX {
        return Err(DomainError::validation(format!(
            "{field} must be at most {POSITIVE_SMALL_INT_MAX}"
        )));
    }
    Ok(())
}
