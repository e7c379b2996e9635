use crate::app_error::RuleViolation;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password rules enforced by every credential store implementation. The
/// codes match what the original backend's identity framework reported, so
/// existing clients keep parsing error lists unchanged.
pub fn check_password(password: &str) -> Vec<RuleViolation> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(RuleViolation::new(
            "PasswordTooShort",
            format!(
                "Passwords must be at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push(RuleViolation::new(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        violations.push(RuleViolation::new(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        violations.push(RuleViolation::new(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').",
        ));
    }
    if password.chars().all(|c| c.is_alphanumeric()) {
        violations.push(RuleViolation::new(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character.",
        ));
    }

    violations
}
