use crate::error::RelayError;

/// Country code prefixed onto bare 10-digit numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a raw phone number for the WhatsApp API.
///
/// Strips everything but digits, prefixes the default country code onto
/// bare 10-digit numbers and adds the leading `+`. Normalizing an
/// already-normalized number is a no-op.
pub fn normalize(raw: &str) -> String {
    let mut cleaned = digits_of(raw);
    if cleaned.len() == 10 {
        cleaned = format!("{}{}", DEFAULT_COUNTRY_CODE, cleaned);
    }
    format!("+{}", cleaned)
}

/// Validate a phone number: 10-15 digits after stripping separators.
/// Returns the cleaned digit string.
pub fn validate(raw: &str) -> Result<String, RelayError> {
    let cleaned = digits_of(raw);
    if cleaned.len() < 10 || cleaned.len() > 15 {
        return Err(RelayError::InvalidPhone(
            "Invalid phone number format".to_string(),
        ));
    }
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_ten_digits_get_country_code() {
        assert_eq!(normalize("9876543210"), "+919876543210");
    }

    #[test]
    fn separators_are_stripped() {
        assert_eq!(normalize("98765 43210"), "+919876543210");
        assert_eq!(normalize("(987) 654-3210"), "+919876543210");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize("9876543210");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn existing_country_code_is_kept() {
        assert_eq!(normalize("+449876543210"), "+449876543210");
    }

    #[test]
    fn validate_accepts_ten_to_fifteen_digits() {
        assert_eq!(validate("9876543210").unwrap(), "9876543210");
        assert_eq!(validate("+91 98765-43210").unwrap(), "919876543210");
        assert!(validate("12345").is_err());
        assert!(validate("1234567890123456").is_err());
        assert!(validate("not a phone").is_err());
    }
}
