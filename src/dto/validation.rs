//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that an upstream event identifier is a short numeric string,
/// the shape the scoreboard API uses for its event IDs.
///
/// # Examples
///
/// ```ignore
/// validate_event_id("401671889") // Ok
/// validate_event_id("")          // Err - empty
/// validate_event_id("abc123")    // Err - non-numeric
/// ```
pub fn validate_event_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.len() > 32 {
        let mut err = ValidationError::new("event_id_length");
        err.message =
            Some(format!("event ID must be between 1 and 32 characters (got {})", id.len()).into());
        return Err(err);
    }

    if !id.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("event_id_format");
        err.message = Some("event ID must contain only digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_event_id_valid() {
        assert!(validate_event_id("401671889").is_ok());
        assert!(validate_event_id("1").is_ok());
    }

    #[test]
    fn test_validate_event_id_invalid_length() {
        assert!(validate_event_id("").is_err());
        assert!(validate_event_id(&"9".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_event_id_invalid_format() {
        assert!(validate_event_id("super-bowl").is_err());
        assert!(validate_event_id("40167 889").is_err());
        assert!(validate_event_id("４０１").is_err()); // full-width digits
    }
}
