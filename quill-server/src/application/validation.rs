//! Field validation for signup and signin input.
//!
//! Runs before any store access; a rejected field never reaches the
//! repositories.

use crate::domain::account::Role;
use crate::domain::DomainError;
use regex::Regex;
use std::sync::OnceLock;

pub fn validate_email(email: &str) -> Result<(), DomainError> {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err(DomainError::ValidationError(
            "Invalid email format".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), DomainError> {
    let length = name.chars().count();
    if !(2..=100).contains(&length) {
        return Err(DomainError::ValidationError(
            "Name must be between 2 and 100 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < 6 {
        return Err(DomainError::ValidationError(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Role defaults to `user` when absent; anything other than the two known
/// roles is rejected.
pub fn validate_role(role: Option<&str>) -> Result<Role, DomainError> {
    match role {
        None => Ok(Role::default()),
        Some(value) => Role::parse(value).ok_or_else(|| {
            DomainError::ValidationError(
                "Invalid role. Must be \"user\" or \"admin\"".to_string(),
            )
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last+tag@sub.domain.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("spaces in@addr.com").is_err());
        assert!(validate_email("a@@b.com").is_err());
    }

    #[test]
    fn name_bounds_are_inclusive() {
        assert!(validate_name("a").is_err());
        assert!(validate_name("ab").is_ok());
        assert!(validate_name(&"x".repeat(100)).is_ok());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn password_minimum_is_six() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(validate_role(None).unwrap(), Role::User);
        assert_eq!(validate_role(Some("user")).unwrap(), Role::User);
        assert_eq!(validate_role(Some("admin")).unwrap(), Role::Admin);
        assert!(validate_role(Some("root")).is_err());
        assert!(validate_role(Some("Admin")).is_err());
    }
}
