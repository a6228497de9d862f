//! Form options and validation trigger policy

use serde::{Deserialize, Serialize};

/// When validation runs before the first submit attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only when the form is submitted
    #[default]
    OnSubmit,
    /// Every time a value changes
    OnChange,
    /// When a field loses focus
    OnBlur,
    /// On the first blur of a field, then on each of its changes
    OnTouched,
    /// On change and on blur
    All,
}

/// When validation runs after the first submit attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevalidateMode {
    #[default]
    OnChange,
    OnBlur,
    OnSubmit,
}

/// How many messages a field collects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaMode {
    /// Stop at the first failing rule
    #[default]
    FirstError,
    /// Report every failing rule
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Change,
    Blur,
}

/// Options for a new form
///
/// ```rust
/// use formbind::{FormOptions, ValidationMode};
///
/// let options: FormOptions<()> = FormOptions {
///     mode: ValidationMode::OnChange,
///     ..Default::default()
/// };
/// assert!(options.default_values.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct FormOptions<T> {
    /// Initial value; dirty tracking compares against it
    pub default_values: Option<T>,
    pub mode: ValidationMode,
    pub revalidate_mode: RevalidateMode,
    pub criteria_mode: CriteriaMode,
}

impl<T> Default for FormOptions<T> {
    fn default() -> Self {
        Self {
            default_values: None,
            mode: ValidationMode::default(),
            revalidate_mode: RevalidateMode::default(),
            criteria_mode: CriteriaMode::default(),
        }
    }
}

impl<T> FormOptions<T> {
    pub fn with_defaults(default_values: T) -> Self {
        Self {
            default_values: Some(default_values),
            ..Default::default()
        }
    }

    pub(crate) fn policy(&self) -> Policy {
        Policy {
            mode: self.mode,
            revalidate_mode: self.revalidate_mode,
            criteria_mode: self.criteria_mode,
        }
    }
}

/// The part of the options a controller keeps after construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Policy {
    pub mode: ValidationMode,
    pub revalidate_mode: RevalidateMode,
    pub criteria_mode: CriteriaMode,
}

impl Policy {
    /// Whether `trigger` on a field should run a validation pass
    pub fn should_validate(&self, trigger: Trigger, submitted: bool, touched: bool) -> bool {
        if submitted {
            return matches!(
                (self.revalidate_mode, trigger),
                (RevalidateMode::OnChange, Trigger::Change) | (RevalidateMode::OnBlur, Trigger::Blur)
            );
        }

        match self.mode {
            ValidationMode::OnSubmit => false,
            ValidationMode::OnChange => trigger == Trigger::Change,
            ValidationMode::OnBlur => trigger == Trigger::Blur,
            ValidationMode::OnTouched => trigger == Trigger::Blur || touched,
            ValidationMode::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy(mode: ValidationMode, revalidate_mode: RevalidateMode) -> Policy {
        Policy {
            mode,
            revalidate_mode,
            criteria_mode: CriteriaMode::FirstError,
        }
    }

    #[rstest]
    #[case(ValidationMode::OnSubmit, Trigger::Change, false, false)]
    #[case(ValidationMode::OnSubmit, Trigger::Blur, false, false)]
    #[case(ValidationMode::OnChange, Trigger::Change, false, true)]
    #[case(ValidationMode::OnChange, Trigger::Blur, false, false)]
    #[case(ValidationMode::OnBlur, Trigger::Change, false, false)]
    #[case(ValidationMode::OnBlur, Trigger::Blur, false, true)]
    #[case(ValidationMode::OnTouched, Trigger::Change, false, false)]
    #[case(ValidationMode::OnTouched, Trigger::Change, true, true)]
    #[case(ValidationMode::OnTouched, Trigger::Blur, false, true)]
    #[case(ValidationMode::All, Trigger::Change, false, true)]
    #[case(ValidationMode::All, Trigger::Blur, false, true)]
    fn test_before_submit(
        #[case] mode: ValidationMode,
        #[case] trigger: Trigger,
        #[case] touched: bool,
        #[case] expected: bool,
    ) {
        let p = policy(mode, RevalidateMode::OnChange);
        assert_eq!(p.should_validate(trigger, false, touched), expected);
    }

    #[rstest]
    #[case(RevalidateMode::OnChange, Trigger::Change, true)]
    #[case(RevalidateMode::OnChange, Trigger::Blur, false)]
    #[case(RevalidateMode::OnBlur, Trigger::Blur, true)]
    #[case(RevalidateMode::OnSubmit, Trigger::Change, false)]
    fn test_after_submit(
        #[case] revalidate: RevalidateMode,
        #[case] trigger: Trigger,
        #[case] expected: bool,
    ) {
        let p = policy(ValidationMode::OnSubmit, revalidate);
        assert_eq!(p.should_validate(trigger, true, false), expected);
    }

    #[test]
    fn test_modes_deserialize_snake_case() {
        let mode: ValidationMode = serde_json::from_str("\"on_touched\"").unwrap();
        assert_eq!(mode, ValidationMode::OnTouched);
    }
}
