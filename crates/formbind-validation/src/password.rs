//! Password validation functions

/// Password strength tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    /// 6+ characters minimum
    Basic,
    /// 8+ chars with uppercase, lowercase, and digit
    Medium,
    /// 8+ chars with uppercase, lowercase, digit, and special character
    Strong,
}

impl PasswordStrength {
    /// Parse a tier name; unknown names fall back to `Strong`
    ///
    /// # Examples
    /// ```
    /// use formbind_validation::password::PasswordStrength;
    /// assert_eq!(PasswordStrength::parse("basic"), PasswordStrength::Basic);
    /// assert_eq!(PasswordStrength::parse("medium"), PasswordStrength::Medium);
    /// assert_eq!(PasswordStrength::parse("anything"), PasswordStrength::Strong);
    /// ```
    pub fn parse(tier: &str) -> Self {
        match tier {
            "basic" => PasswordStrength::Basic,
            "medium" => PasswordStrength::Medium,
            _ => PasswordStrength::Strong,
        }
    }
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '@' | '$' | '!' | '%' | '*' | '?' | '&' | '#' | '-' | '_' | '+' | '=' | '.' | ','
    )
}

/// Validates a password against a strength tier
pub fn validate_password(password: &str, strength: PasswordStrength) -> Result<(), String> {
    let len = password.chars().count();

    if strength == PasswordStrength::Basic {
        return if len >= 6 {
            Ok(())
        } else {
            Err("Password must be at least 6 characters".to_string())
        };
    }

    if len < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    let has_uppercase = password.chars().any(char::is_uppercase);
    let has_lowercase = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if strength == PasswordStrength::Medium {
        if !has_uppercase || !has_lowercase || !has_digit {
            return Err("Password must contain uppercase, lowercase, and digit".to_string());
        }
        return Ok(());
    }

    if !has_uppercase {
        return Err("Password must contain at least one uppercase letter".to_string());
    }
    if !has_lowercase {
        return Err("Password must contain at least one lowercase letter".to_string());
    }
    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(is_special) {
        return Err(
            "Password must contain at least one special character (@$!%*?&#-_+=.,)".to_string(),
        );
    }

    Ok(())
}
