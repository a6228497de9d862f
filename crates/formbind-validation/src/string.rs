//! String validation functions

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+(:\d+)?([/?#]\S*)?$")
        .expect("URL regex is valid")
});

/// Length in characters, not bytes
fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_min_length(s: &str, min: usize) -> Result<(), String> {
    if char_len(s) >= min {
        Ok(())
    } else {
        Err(format!("Must be at least {} characters", min))
    }
}

pub fn validate_max_length(s: &str, max: usize) -> Result<(), String> {
    if char_len(s) <= max {
        Ok(())
    } else {
        Err(format!("Must be at most {} characters", max))
    }
}

pub fn validate_length(s: &str, min: usize, max: usize) -> Result<(), String> {
    let len = char_len(s);
    if len >= min && len <= max {
        Ok(())
    } else {
        Err(format!("Must be between {} and {} characters", min, max))
    }
}

/// True when the string is empty or only whitespace
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// http(s) URL with a dotted host
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

pub fn matches_pattern(value: &str, pattern: &Regex) -> bool {
    pattern.is_match(value)
}

/// Enum/value restriction
pub fn is_one_of<S: AsRef<str>>(value: &str, allowed: &[S]) -> bool {
    allowed.iter().any(|a| a.as_ref() == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_validators() {
        assert!(validate_min_length("hello", 3).is_ok());
        assert!(validate_min_length("hi", 3).is_err());

        assert!(validate_max_length("hello", 10).is_ok());
        assert!(validate_max_length("verylongstring", 5).is_err());

        assert!(validate_length("hello", 3, 10).is_ok());
        assert!(validate_length("hi", 3, 10).is_err());
        assert!(validate_length("verylongstring", 3, 10).is_err());
    }

    #[test]
    fn test_length_counts_chars() {
        assert!(validate_max_length("héllo", 5).is_ok());
        assert!(validate_min_length("日本", 2).is_ok());
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://test.co.uk"));
        assert!(is_valid_url("https://example.com/path?q=1"));
        assert!(is_valid_url("http://localhost.dev:8080"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://"));
        assert!(!is_valid_url("http://nodomain"));
    }

    #[test]
    fn test_pattern() {
        let sku = Regex::new(r"^[A-Z]{3}-\d{4}$").unwrap();
        assert!(matches_pattern("ABC-1234", &sku));
        assert!(!matches_pattern("abc-1234", &sku));
    }

    #[test]
    fn test_one_of() {
        let allowed = ["admin", "user", "guest"];
        assert!(is_one_of("admin", &allowed));
        assert!(!is_one_of("superuser", &allowed));

        let owned = vec!["a".to_string()];
        assert!(is_one_of("a", &owned));
    }
}
