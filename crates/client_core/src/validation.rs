use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern")
});

pub const MIN_PASSWORD_LEN: usize = 8;

/// Per-field messages produced by local form checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }

    /// First failing field's message, in form order.
    pub fn first_error(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or(self.password.as_deref())
            .or(self.confirm_password.as_deref())
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn email_error(email: &str) -> Option<String> {
    if email.trim().is_empty() {
        Some("Email is required".to_string())
    } else if !is_valid_email(email) {
        Some("Please enter a valid email address".to_string())
    } else {
        None
    }
}

pub fn password_error(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Some(
            "Password must contain an uppercase letter, a lowercase letter and a digit"
                .to_string(),
        );
    }
    None
}

pub fn confirmation_error(password: &str, confirmation: &str) -> Option<String> {
    if confirmation.is_empty() {
        Some("Please confirm your password".to_string())
    } else if password != confirmation {
        Some("Passwords do not match".to_string())
    } else {
        None
    }
}

pub fn validate_signup(email: &str, password: &str, confirmation: &str) -> ValidationReport {
    ValidationReport {
        email: email_error(email),
        password: password_error(password),
        confirm_password: confirmation_error(password, confirmation),
    }
}

/// Login only checks presence and shape; strength rules apply at signup.
pub fn validate_login(email: &str, password: &str) -> ValidationReport {
    ValidationReport {
        email: email_error(email),
        password: password
            .is_empty()
            .then(|| "Password is required".to_string()),
        confirm_password: None,
    }
}

/// Trims `value` and maps blank input to `None`.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
