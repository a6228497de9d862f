//! Single-field rules and how they apply to a raw JSON value

use std::fmt;
use std::sync::Arc;

use formbind_validation as v;
use formbind_validation::PasswordStrength;
use regex::Regex;
use serde_json::Value;

pub(crate) type CustomFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Check {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    MinLength(usize),
    MaxLength(usize),
    Length(usize, usize),
    Min(f64),
    Max(f64),
    Range(f64, f64),
    Positive,
    Email,
    Url,
    Pattern(Regex),
    OneOf(Vec<String>),
    Password(PasswordStrength),
    NoPublicDomains,
    BlockedDomains(Vec<String>),
    MinItems(usize),
    MaxItems(usize),
    UniqueItems,
    Custom(CustomFn),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Check::Custom(_) => f.write_str("Custom(..)"),
            Check::MinLength(n) => write!(f, "MinLength({})", n),
            Check::MaxLength(n) => write!(f, "MaxLength({})", n),
            Check::Length(min, max) => write!(f, "Length({}, {})", min, max),
            Check::Min(n) => write!(f, "Min({})", n),
            Check::Max(n) => write!(f, "Max({})", n),
            Check::Range(min, max) => write!(f, "Range({}, {})", min, max),
            Check::OneOf(values) => write!(f, "OneOf({:?})", values),
            Check::Password(strength) => write!(f, "Password({:?})", strength),
            Check::BlockedDomains(domains) => write!(f, "BlockedDomains({:?})", domains),
            Check::MinItems(n) => write!(f, "MinItems({})", n),
            Check::MaxItems(n) => write!(f, "MaxItems({})", n),
            other => f.write_str(other.name()),
        }
    }
}

/// Why a rule rejected a value
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Failure {
    /// The value has the wrong type; later rules for the field are skipped
    Type(String),
    Constraint(String),
}

impl Check {
    fn name(&self) -> &'static str {
        match self {
            Check::String => "String",
            Check::Integer => "Integer",
            Check::Number => "Number",
            Check::Boolean => "Boolean",
            Check::Array => "Array",
            Check::Positive => "Positive",
            Check::Email => "Email",
            Check::Url => "Url",
            Check::NoPublicDomains => "NoPublicDomains",
            Check::UniqueItems => "UniqueItems",
            _ => "Check",
        }
    }

    pub(crate) fn apply(&self, value: &Value) -> Result<(), Failure> {
        match self {
            Check::String => expect_str(value).map(drop),
            Check::Integer => match value.as_f64() {
                Some(n) if v::is_integral(n) => Ok(()),
                _ => Err(Failure::Type("Must be a whole number".to_string())),
            },
            Check::Number => expect_number(value).map(drop),
            Check::Boolean => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(Failure::Type("Must be true or false".to_string())),
            },
            Check::Array => expect_array(value).map(drop),

            Check::MinLength(min) => constraint(v::validate_min_length(expect_str(value)?, *min)),
            Check::MaxLength(max) => constraint(v::validate_max_length(expect_str(value)?, *max)),
            Check::Length(min, max) => {
                constraint(v::validate_length(expect_str(value)?, *min, *max))
            }

            Check::Min(min) => constraint(v::validate_min(expect_number(value)?, *min)),
            Check::Max(max) => constraint(v::validate_max(expect_number(value)?, *max)),
            Check::Range(min, max) => {
                constraint(v::validate_range(expect_number(value)?, *min, *max))
            }
            Check::Positive => constraint(v::validate_positive(expect_number(value)?)),

            Check::Email => check(v::is_valid_email(expect_str(value)?), "Invalid email address"),
            Check::Url => check(v::is_valid_url(expect_str(value)?), "Invalid URL"),
            Check::Pattern(re) => check(
                v::matches_pattern(expect_str(value)?, re),
                "Invalid format",
            ),
            Check::OneOf(allowed) => {
                let s = expect_str(value)?;
                check(
                    v::is_one_of(s, allowed.as_slice()),
                    format!("Must be one of: {}", allowed.join(", ")),
                )
            }
            Check::Password(strength) => {
                constraint(v::validate_password(expect_str(value)?, *strength))
            }
            Check::NoPublicDomains => check(
                !v::is_public_domain(expect_str(value)?),
                "Public email domains are not allowed",
            ),
            Check::BlockedDomains(blocked) => check(
                !v::is_blocked_domain(expect_str(value)?, blocked),
                "This email domain is blocked",
            ),

            Check::MinItems(min) => constraint(v::validate_min_items(expect_array(value)?, *min)),
            Check::MaxItems(max) => constraint(v::validate_max_items(expect_array(value)?, *max)),
            Check::UniqueItems => constraint(v::validate_unique(expect_array(value)?)),

            Check::Custom(f) => constraint(f(value)),
        }
    }
}

fn expect_str(value: &Value) -> Result<&str, Failure> {
    value
        .as_str()
        .ok_or_else(|| Failure::Type("Must be text".to_string()))
}

fn expect_number(value: &Value) -> Result<f64, Failure> {
    value
        .as_f64()
        .ok_or_else(|| Failure::Type("Must be a number".to_string()))
}

fn expect_array(value: &Value) -> Result<&[Value], Failure> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| Failure::Type("Must be a list".to_string()))
}

fn constraint(result: Result<(), String>) -> Result<(), Failure> {
    result.map_err(Failure::Constraint)
}

fn check(ok: bool, message: impl Into<String>) -> Result<(), Failure> {
    if ok {
        Ok(())
    } else {
        Err(Failure::Constraint(message.into()))
    }
}

/// A check plus an optional message override
#[derive(Debug, Clone)]
pub(crate) struct Rule {
    pub(crate) check: Check,
    pub(crate) message: Option<String>,
}

impl Rule {
    pub(crate) fn new(check: Check) -> Self {
        Self {
            check,
            message: None,
        }
    }

    pub(crate) fn apply(&self, value: &Value) -> Result<(), Failure> {
        self.check.apply(value).map_err(|failure| match &self.message {
            None => failure,
            Some(message) => match failure {
                Failure::Type(_) => Failure::Type(message.clone()),
                Failure::Constraint(_) => Failure::Constraint(message.clone()),
            },
        })
    }
}
