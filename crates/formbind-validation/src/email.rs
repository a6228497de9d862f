//! Email validation functions

/// Common free email providers
pub const PUBLIC_DOMAINS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "icloud.com",
    "aol.com",
    "mail.com",
    "protonmail.com",
    "yandex.com",
    "zoho.com",
];

/// Validates basic email format
///
/// Checks for:
/// - Exactly one '@' with content on both sides
/// - At least one '.' in the domain, no leading/trailing dot or hyphen
/// - A top-level domain of two or more characters
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if domain.contains('@') {
        return false;
    }

    if local.is_empty() || local.len() > 64 {
        return false;
    }

    if domain.is_empty() || domain.len() > 255 || !domain.contains('.') {
        return false;
    }

    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains("..") {
        return false;
    }

    let valid_local = local
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'));
    let valid_domain = domain
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-'));

    if !valid_local || !valid_domain {
        return false;
    }

    domain
        .rsplit_once('.')
        .map(|(_, tld)| tld.len() >= 2)
        .unwrap_or(false)
}

/// Domain part of an address, if there is one
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Checks if email domain is a public domain (gmail, yahoo, etc.)
pub fn is_public_domain(email: &str) -> bool {
    email_domain(email)
        .map(|domain| PUBLIC_DOMAINS.iter().any(|d| d.eq_ignore_ascii_case(domain)))
        .unwrap_or(false)
}

/// Checks if email domain is in the blocked list
pub fn is_blocked_domain(email: &str, blocked: &[String]) -> bool {
    email_domain(email)
        .map(|domain| blocked.iter().any(|b| b.eq_ignore_ascii_case(domain)))
        .unwrap_or(false)
}
