use crate::error::{Error, Result};

/// Trim a required form field, rejecting empty input before any storage
/// call is made.
pub fn require_field(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("Please enter a {what}.")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_trims() {
        assert_eq!(require_field("  demo  ", "site name").unwrap(), "demo");
    }

    #[test]
    fn test_require_field_rejects_empty() {
        let err = require_field("   ", "site name").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "validation error: Please enter a site name.");
    }
}
