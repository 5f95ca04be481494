//! Phone number normalization for contact import matching.

/// Normalize a phone number for matching: strip every non-digit, keep the
/// last 10 digits. Returns `None` when fewer than 10 digits remain, since
/// short fragments would false-match on suffixes.
///
/// `"+1 (555) 123-4567"` and `"5551234567"` normalize to the same key.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }
    Some(digits[digits.len() - 10..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_table() {
        let cases: &[(&str, Option<&str>)] = &[
            ("+1 (555) 123-4567", Some("5551234567")),
            ("5551234567", Some("5551234567")),
            ("015551234567", Some("5551234567")),
            ("555-123-4567", Some("5551234567")),
            ("+880 1712-345678", Some("1712345678")),
            ("12345", None),
            ("", None),
            ("call me", None),
            ("555123456", None), // 9 digits
        ];
        for (raw, expected) in cases {
            assert_eq!(
                normalize_phone(raw).as_deref(),
                *expected,
                "input: {raw:?}"
            );
        }
    }

    #[test]
    fn test_country_code_variants_collide() {
        assert_eq!(
            normalize_phone("+1 555 123 4567"),
            normalize_phone("(555) 123-4567")
        );
    }
}
