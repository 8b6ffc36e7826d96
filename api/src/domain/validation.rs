use once_cell::sync::Lazy;
use regex::Regex;

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});
// Digits plus spaces, dashes and brackets, seven characters or more.
static RE_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,}[0-9]$").expect("valid phone regex"));

/// Field-level rule violations raised while building domain records.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },
    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },
    #[error("{0}")]
    Rule(String),
}

/// Trims `value` and rejects it when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

pub fn required_max(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let v = required(field, value)?;
    max_len(field, &v, max)?;
    Ok(v)
}

pub fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Trims an optional text field, mapping blank input to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn in_range(field: &'static str, value: i64, min: i64, max: i64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}

pub fn email(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let v = required(field, value)?.to_lowercase();
    if !RE_EMAIL.is_match(&v) {
        return Err(ValidationError::Invalid { field, value: v });
    }
    Ok(v)
}

pub fn phone(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let v = required(field, value)?;
    if !RE_PHONE.is_match(&v) {
        return Err(ValidationError::Invalid { field, value: v });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Asha ").unwrap(), "Asha");
        assert_eq!(
            required("name", "   "),
            Err(ValidationError::Required { field: "name" })
        );
    }

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(email("email", " Parent@School.IN ").unwrap(), "parent@school.in");
        assert!(email("email", "no-at-sign").is_err());
        assert!(email("email", "@school.in").is_err());
        assert!(email("email", "a b@school.in").is_err());
    }

    #[test]
    fn phone_accepts_separators_only() {
        assert_eq!(phone("phone", " +91 98765-43210 ").unwrap(), "+91 98765-43210");
        assert!(phone("phone", "call me").is_err());
        assert!(phone("phone", "12").is_err());
    }

    #[test]
    fn max_len_counts_chars_not_bytes() {
        assert!(max_len("title", "ééé", 3).is_ok());
        assert!(max_len("title", "éééé", 3).is_err());
    }
}
