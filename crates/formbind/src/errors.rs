//! The validation error mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key for problems that belong to the whole form rather than one field
pub const FORM_ERROR_KEY: &str = "_form";

/// Field path to error messages
///
/// This is the only failure the form layer produces. It is returned as data
/// and also implements `std::error::Error` so a caller can `?` it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed for {} field(s): {}", .fields.len(), summary(.fields))]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn first(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }

    pub(crate) fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub(crate) fn extend_field(&mut self, field: &str, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.fields
            .entry(field.to_string())
            .or_default()
            .extend(messages);
    }

    pub(crate) fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.extend_field(&field, messages);
        }
    }
}

fn summary(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add("email", "Invalid email address");
        errors.add("email", "Public domains are not allowed");
        errors.add("name", "This field is required");

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("email"));
        assert_eq!(errors.first("email"), Some("Invalid email address"));
        assert_eq!(errors.get("email").map(<[String]>::len), Some(2));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email", "name"]);
        assert!(errors.first("age").is_none());
    }

    #[test]
    fn test_merge_and_display() {
        let mut left = ValidationErrors::new();
        left.add("name", "required");

        let mut right = ValidationErrors::new();
        right.add("name", "too short");
        right.add("age", "too young");
        right.extend_field("ignored", Vec::new());

        left.merge(right);
        assert_eq!(left.get("name").unwrap(), ["required", "too short"]);
        assert!(!left.contains("ignored"));
        assert_eq!(
            left.to_string(),
            "validation failed for 2 field(s): age, name"
        );
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut errors = ValidationErrors::new();
        errors.add("quantity", "Must be a positive number");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "quantity": ["Must be a positive number"] })
        );
    }
}
