pub mod password;
pub mod role;
pub mod token;

pub use password::{hash_password, is_acceptable_password, verify_password, PasswordError, MIN_PASSWORD_LENGTH};
pub use role::Role;
pub use token::{Claims, TokenError, TokenService};

/// Loose shape check: one `@`, non-empty local part, dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email_format("me@example.com").is_ok());
        assert!(validate_email_format("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "plain", "a@b", "@example.com", "a@@example.com", "a b@example.com", "a@example."] {
            assert!(validate_email_format(email).is_err(), "{email} should be rejected");
        }
    }
}
