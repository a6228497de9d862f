//! Validation schemas
//!
//! A [`Schema<T>`] is declared against an explicit value type `T`. Field rules
//! run over the raw [`FormValues`]; once every rule passes, the value must also
//! deserialize into `T`, which is how the schema and the type are kept in
//! agreement. Schemas are immutable after [`SchemaBuilder::build`] and are
//! meant to be shared (`Arc<Schema<T>>`) across any number of forms.
//!
//! ```rust
//! use formbind::{CriteriaMode, FormValues, Schema};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Signup {
//!     name: String,
//!     email: String,
//! }
//!
//! let schema = Schema::<Signup>::builder()
//!     .field("name", |f| f.required().string().min_length(2))
//!     .field("email", |f| f.required().email())
//!     .build();
//!
//! let errors = schema.validate(&FormValues::from_value(json!({})), CriteriaMode::FirstError);
//! assert!(errors.contains("name") && errors.contains("email"));
//! ```

mod rule;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use formbind_validation::{is_blank, PasswordStrength};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{ValidationErrors, FORM_ERROR_KEY};
use crate::options::CriteriaMode;
use crate::path::FieldPath;
use crate::values::FormValues;
use rule::{Check, Failure, Rule};

const REQUIRED_MESSAGE: &str = "This field is required";

type RefineFn = Arc<dyn Fn(&FormValues) -> Result<(), String> + Send + Sync>;

/// Rules for one field, in declaration order
#[derive(Debug, Clone, Default)]
struct FieldSchema {
    required: bool,
    required_message: Option<String>,
    rules: Vec<Rule>,
}

impl FieldSchema {
    fn validate(&self, value: Option<&Value>, criteria: CriteriaMode) -> Vec<String> {
        let value = match value {
            Some(value) if !is_absent(value) => value,
            _ if self.required => {
                let message = self.required_message.as_deref().unwrap_or(REQUIRED_MESSAGE);
                return vec![message.to_string()];
            }
            // Optional and empty: nothing else to check
            _ => return Vec::new(),
        };

        let mut messages = Vec::new();
        for rule in &self.rules {
            match rule.apply(value) {
                Ok(()) => {}
                Err(Failure::Type(message)) => {
                    messages.push(message);
                    break;
                }
                Err(Failure::Constraint(message)) => {
                    messages.push(message);
                    if criteria == CriteriaMode::FirstError {
                        break;
                    }
                }
            }
        }
        messages
    }
}

/// `null`, or a string with nothing but whitespace
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_blank(s),
        _ => false,
    }
}

/// Check that needs more than one field; errors land on `path`
#[derive(Clone)]
struct CrossFieldCheck {
    path: FieldPath,
    check: RefineFn,
}

/// Builds the rule list for a single field
///
/// Every method appends one rule. [`FieldBuilder::message`] replaces the
/// message of whatever was declared last, `required` included.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    field: FieldSchema,
    required_last: bool,
}

impl FieldBuilder {
    fn push(mut self, check: Check) -> Self {
        self.field.rules.push(Rule::new(check));
        self.required_last = false;
        self
    }

    pub fn required(mut self) -> Self {
        self.field.required = true;
        self.required_last = true;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        match self.field.rules.last_mut() {
            Some(rule) if !self.required_last => rule.message = message,
            _ => self.field.required_message = message,
        }
        self
    }

    pub fn string(self) -> Self {
        self.push(Check::String)
    }

    pub fn integer(self) -> Self {
        self.push(Check::Integer)
    }

    pub fn number(self) -> Self {
        self.push(Check::Number)
    }

    pub fn boolean(self) -> Self {
        self.push(Check::Boolean)
    }

    pub fn array(self) -> Self {
        self.push(Check::Array)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.push(Check::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.push(Check::MaxLength(max))
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.push(Check::Length(min, max))
    }

    pub fn min(self, min: f64) -> Self {
        self.push(Check::Min(min))
    }

    pub fn max(self, max: f64) -> Self {
        self.push(Check::Max(max))
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.push(Check::Range(min, max))
    }

    /// Strictly greater than zero
    pub fn positive(self) -> Self {
        self.push(Check::Positive)
    }

    pub fn email(self) -> Self {
        self.push(Check::Email)
    }

    pub fn url(self) -> Self {
        self.push(Check::Url)
    }

    pub fn pattern(self, pattern: Regex) -> Self {
        self.push(Check::Pattern(pattern))
    }

    pub fn one_of<I, S>(self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Check::OneOf(allowed.into_iter().map(Into::into).collect()))
    }

    pub fn password(self, strength: PasswordStrength) -> Self {
        self.push(Check::Password(strength))
    }

    pub fn no_public_domains(self) -> Self {
        self.push(Check::NoPublicDomains)
    }

    pub fn blocked_domains<I, S>(self, blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Check::BlockedDomains(
            blocked.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn min_items(self, min: usize) -> Self {
        self.push(Check::MinItems(min))
    }

    pub fn max_items(self, max: usize) -> Self {
        self.push(Check::MaxItems(max))
    }

    pub fn unique_items(self) -> Self {
        self.push(Check::UniqueItems)
    }

    /// Arbitrary check over the field's raw value; must be deterministic
    pub fn custom<F>(self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.push(Check::Custom(Arc::new(check)))
    }
}

/// An immutable validation schema for values of type `T`
pub struct Schema<T> {
    fields: Vec<(FieldPath, FieldSchema)>,
    checks: Vec<CrossFieldCheck>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            fields: Vec::new(),
            checks: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn field_paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.fields.iter().map(|(path, _)| path)
    }

    pub fn has_field(&self, path: &FieldPath) -> bool {
        self.fields.iter().any(|(p, _)| p == path)
    }

    /// Run every field rule and cross-field check against `values`
    ///
    /// All fields are checked; a failing field never hides another field's
    /// errors. A cross-field check is skipped when its target field already
    /// failed its own rules.
    pub fn validate(&self, values: &FormValues, criteria: CriteriaMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for (path, field) in &self.fields {
            let key = path.to_string();
            errors.extend_field(&key, field.validate(values.get(path), criteria));
        }

        for cross in &self.checks {
            let key = cross.path.to_string();
            if errors.contains(&key) {
                continue;
            }
            if let Err(message) = (cross.check)(values) {
                errors.add(key, message);
            }
        }

        tracing::trace!(
            fields = self.fields.len(),
            failed = errors.len(),
            "schema validation pass"
        );
        errors
    }
}

impl<T: DeserializeOwned> Schema<T> {
    /// Validate, then produce the typed value
    ///
    /// When the rules pass but the value still does not fit `T`, the failure
    /// is reported under [`FORM_ERROR_KEY`].
    pub fn parse(&self, values: &FormValues, criteria: CriteriaMode) -> Result<T, ValidationErrors> {
        let mut errors = self.validate(values, criteria);
        if !errors.is_empty() {
            return Err(errors);
        }

        values.to_typed::<T>().map_err(|e| {
            errors.add(
                FORM_ERROR_KEY,
                format!("Value does not match the expected shape: {}", e),
            );
            errors
        })
    }
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            checks: self.checks.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field(
                "fields",
                &self.fields.iter().map(|(p, s)| (p.to_string(), s)).collect::<Vec<_>>(),
            )
            .field("cross_field_checks", &self.checks.len())
            .finish()
    }
}

pub struct SchemaBuilder<T> {
    fields: Vec<(FieldPath, FieldSchema)>,
    checks: Vec<CrossFieldCheck>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> SchemaBuilder<T> {
    /// Declare the rules for `path`, replacing any earlier declaration
    pub fn field<F>(mut self, path: impl Into<FieldPath>, rules: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        let field = rules(FieldBuilder::default()).field;
        self.declare(path.into(), field);
        self
    }

    fn declare(&mut self, path: FieldPath, field: FieldSchema) {
        match self.fields.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = field,
            None => self.fields.push((path, field)),
        }
    }

    /// `path` must hold the same value as `other`
    pub fn equals_field(self, path: impl Into<FieldPath>, other: impl Into<FieldPath>) -> Self {
        let other = other.into();
        let message = format!("Must match {}", other);
        let path = path.into();
        let target = path.clone();
        self.refine(path, move |values| {
            if values.get(&target) == values.get(&other) {
                Ok(())
            } else {
                Err(message.clone())
            }
        })
    }

    /// Cross-field check over the whole raw value; errors are keyed at `path`
    pub fn refine<F>(mut self, path: impl Into<FieldPath>, check: F) -> Self
    where
        F: Fn(&FormValues) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push(CrossFieldCheck {
            path: path.into(),
            check: Arc::new(check),
        });
        self
    }

    /// Embed another schema's fields and checks under `prefix`
    ///
    /// Nested fields replace earlier declarations of the same path.
    pub fn nest<U>(mut self, prefix: impl Into<FieldPath>, schema: &Schema<U>) -> Self {
        let prefix = prefix.into();

        for (path, field) in &schema.fields {
            let mut nested = prefix.clone();
            for segment in path.segments() {
                nested = nested.join(segment.clone());
            }
            self.declare(nested, field.clone());
        }

        for cross in &schema.checks {
            let mut nested = prefix.clone();
            for segment in cross.path.segments() {
                nested = nested.join(segment.clone());
            }
            let scope = prefix.clone();
            let inner = cross.check.clone();
            self.checks.push(CrossFieldCheck {
                path: nested,
                check: Arc::new(move |values: &FormValues| {
                    let scoped = values.get(&scope).cloned().unwrap_or(Value::Null);
                    inner(&FormValues::from_value(scoped))
                }),
            });
        }

        self
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            fields: self.fields,
            checks: self.checks,
            _marker: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Signup {
        name: String,
        email: String,
        password: String,
        confirm: String,
    }

    fn signup_schema() -> Schema<Signup> {
        Schema::builder()
            .field("name", |f| f.required().string().min_length(2))
            .field("email", |f| f.required().email().no_public_domains())
            .field("password", |f| f.required().password(PasswordStrength::Medium))
            .field("confirm", |f| f.required())
            .equals_field("confirm", "password")
            .build()
    }

    fn values(value: Value) -> FormValues {
        FormValues::from_value(value)
    }

    #[test]
    fn test_required_fields_reported_together() {
        let errors = signup_schema().validate(&values(json!({})), CriteriaMode::FirstError);
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec!["confirm", "email", "name", "password"]
        );
        assert_eq!(errors.first("name"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let errors = signup_schema().validate(&values(json!({ "name": "   " })), CriteriaMode::FirstError);
        assert_eq!(errors.first("name"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_criteria_mode_all_collects_every_message() {
        let schema = Schema::<()>::builder()
            .field("email", |f| f.email().no_public_domains().min_length(30))
            .build();
        let input = values(json!({ "email": "a@gmail.com" }));

        let first = schema.validate(&input, CriteriaMode::FirstError);
        assert_eq!(first.get("email").map(<[String]>::len), Some(1));

        let all = schema.validate(&input, CriteriaMode::All);
        assert_eq!(
            all.get("email").unwrap(),
            [
                "Public email domains are not allowed",
                "Must be at least 30 characters"
            ]
        );
    }

    #[test]
    fn test_type_failure_stops_field() {
        let schema = Schema::<()>::builder()
            .field("age", |f| f.integer().min(18.0))
            .build();
        let errors = schema.validate(&values(json!({ "age": "old" })), CriteriaMode::All);
        assert_eq!(errors.get("age").unwrap(), ["Must be a whole number"]);
    }

    #[test]
    fn test_optional_field_skips_rules_when_empty() {
        let schema = Schema::<()>::builder()
            .field("website", |f| f.url())
            .build();
        assert!(schema.validate(&values(json!({})), CriteriaMode::All).is_empty());
        assert!(schema
            .validate(&values(json!({ "website": "" })), CriteriaMode::All)
            .is_empty());
        assert!(schema
            .validate(&values(json!({ "website": "nope" })), CriteriaMode::All)
            .contains("website"));
    }

    #[test]
    fn test_cross_field_check() {
        let schema = signup_schema();
        let input = values(json!({
            "name": "Ana",
            "email": "ana@company.io",
            "password": "Password1",
            "confirm": "Password2"
        }));
        let errors = schema.validate(&input, CriteriaMode::FirstError);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["confirm"]);
        assert_eq!(errors.first("confirm"), Some("Must match password"));
    }

    #[test]
    fn test_cross_field_skipped_when_field_already_failed() {
        let errors = signup_schema().validate(
            &values(json!({ "password": "Password1" })),
            CriteriaMode::All,
        );
        assert_eq!(errors.get("confirm").unwrap(), [REQUIRED_MESSAGE]);
    }

    #[test]
    fn test_parse_success() {
        let input = values(json!({
            "name": "Ana",
            "email": "ana@company.io",
            "password": "Password1",
            "confirm": "Password1"
        }));
        let signup = signup_schema().parse(&input, CriteriaMode::FirstError).unwrap();
        assert_eq!(signup.name, "Ana");
    }

    #[test]
    fn test_parse_reports_shape_mismatch_under_form_key() {
        #[derive(Debug, Deserialize)]
        struct Order {
            #[allow(dead_code)]
            quantity: u32,
        }

        // The schema does not require `quantity`, but the type does
        let schema = Schema::<Order>::builder().build();
        let errors = schema
            .parse(&values(json!({})), CriteriaMode::FirstError)
            .unwrap_err();
        assert!(errors.contains(FORM_ERROR_KEY));
    }

    #[test]
    fn test_field_redeclaration_replaces() {
        let schema = Schema::<()>::builder()
            .field("name", |f| f.required())
            .field("name", |f| f.max_length(3))
            .build();
        assert_eq!(schema.field_paths().count(), 1);
        assert!(schema.validate(&values(json!({})), CriteriaMode::All).is_empty());
    }

    #[test]
    fn test_message_override_on_required() {
        let schema = Schema::<()>::builder()
            .field("name", |f| f.required().message("Tell us your name"))
            .build();
        let errors = schema.validate(&values(json!({})), CriteriaMode::All);
        assert_eq!(errors.first("name"), Some("Tell us your name"));
    }

    #[test]
    fn test_message_after_required_targets_required() {
        let schema = Schema::<()>::builder()
            .field("name", |f| f.string().required().message("Name please"))
            .build();
        let missing = schema.validate(&values(json!({})), CriteriaMode::All);
        assert_eq!(missing.first("name"), Some("Name please"));

        let wrong_type = schema.validate(&values(json!({ "name": 7 })), CriteriaMode::All);
        assert_ne!(wrong_type.first("name"), Some("Name please"));
    }

    #[test]
    fn test_message_after_rule_leaves_required_default() {
        let schema = Schema::<()>::builder()
            .field("name", |f| f.required().min_length(3).message("Too short"))
            .build();
        let errors = schema.validate(&values(json!({})), CriteriaMode::All);
        assert_eq!(errors.first("name"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_nest_replaces_existing_declaration() {
        let address = Schema::<()>::builder()
            .field("city", |f| f.required().message("City is missing"))
            .build();
        let schema = Schema::<()>::builder()
            .field("shipping.city", |f| f.required())
            .nest("shipping", &address)
            .build();

        assert_eq!(schema.field_paths().count(), 1);
        let errors = schema.validate(&values(json!({})), CriteriaMode::FirstError);
        assert_eq!(errors.get("shipping.city").unwrap(), ["City is missing"]);
    }

    #[test]
    fn test_nest_prefixes_fields_and_checks() {
        let address = Schema::<()>::builder()
            .field("city", |f| f.required())
            .field("zip", |f| f.required().pattern(Regex::new(r"^\d{4}$").unwrap()))
            .refine("zip", |v| match v.get(&"city".into()) {
                Some(Value::String(city)) if city == "Oslo" => match v.get(&"zip".into()) {
                    Some(Value::String(zip)) if zip.starts_with('0') => Ok(()),
                    _ => Err("Oslo zip codes start with 0".to_string()),
                },
                _ => Ok(()),
            })
            .build();

        let schema = Schema::<()>::builder().nest("shipping", &address).build();
        assert!(schema.has_field(&"shipping.city".into()));

        let errors = schema.validate(
            &values(json!({ "shipping": { "city": "Oslo", "zip": "5003" } })),
            CriteriaMode::All,
        );
        assert_eq!(errors.first("shipping.zip"), Some("Oslo zip codes start with 0"));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let schema = signup_schema();
        let input = values(json!({ "name": "A", "email": "x" }));
        assert_eq!(
            schema.validate(&input, CriteriaMode::All),
            schema.clone().validate(&input, CriteriaMode::All)
        );
    }
}
