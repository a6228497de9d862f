//! Schema-bound form controller
//!
//! `FormController<T>` owns a [`FormState`] and routes every change through
//! the schema it was created with. Validation failures are returned as data
//! ([`ValidationErrors`]); no operation here panics or returns `Err` for an
//! invalid value.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ValidationErrors;
use crate::notifier::{Notifier, NotifyOptions};
use crate::options::{FormOptions, Policy, Trigger};
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::state::FormState;
use crate::values::FormValues;

/// Outcome of a submit: the typed value or the full error mapping, never both
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult<T> {
    Valid(T),
    Invalid(ValidationErrors),
}

impl<T> SubmitResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, SubmitResult::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            SubmitResult::Valid(value) => Some(value),
            SubmitResult::Invalid(_) => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            SubmitResult::Valid(_) => None,
            SubmitResult::Invalid(errors) => Some(errors),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            SubmitResult::Valid(value) => Some(value),
            SubmitResult::Invalid(_) => None,
        }
    }

    pub fn err(self) -> Option<ValidationErrors> {
        match self {
            SubmitResult::Valid(_) => None,
            SubmitResult::Invalid(errors) => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, ValidationErrors> {
        self.into()
    }
}

impl<T> From<Result<T, ValidationErrors>> for SubmitResult<T> {
    fn from(result: Result<T, ValidationErrors>) -> Self {
        match result {
            Ok(value) => SubmitResult::Valid(value),
            Err(errors) => SubmitResult::Invalid(errors),
        }
    }
}

impl<T> From<SubmitResult<T>> for Result<T, ValidationErrors> {
    fn from(result: SubmitResult<T>) -> Self {
        match result {
            SubmitResult::Valid(value) => Ok(value),
            SubmitResult::Invalid(errors) => Err(errors),
        }
    }
}

pub struct FormController<T> {
    id: Uuid,
    schema: Arc<Schema<T>>,
    policy: Policy,
    state: FormState<T>,
}

impl<T> FormController<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(schema: Arc<Schema<T>>, options: FormOptions<T>) -> Self {
        let id = Uuid::new_v4();
        let policy = options.policy();
        let defaults = initial_values(id, options.default_values.as_ref());
        let is_valid = schema.parse(&defaults, policy.criteria_mode).is_ok();

        debug!(form_id = %id, mode = ?policy.mode, "form created");

        Self {
            id,
            schema,
            policy,
            state: FormState::new(defaults, is_valid),
        }
    }

    /// Identifier used in log output
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    pub fn state(&self) -> &FormState<T> {
        &self.state
    }

    /// Raw values, possibly not (yet) valid
    pub fn values(&self) -> &FormValues {
        &self.state.values
    }

    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&Value> {
        self.state.values.get(&path.into())
    }

    /// The current values as `T`, if they have that shape right now
    ///
    /// This does not run the schema; use [`FormController::submit`] for a
    /// validated value.
    pub fn value(&self) -> Option<T> {
        self.state.values.to_typed().ok()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.state.errors
    }

    pub fn field_error(&self, path: impl Into<FieldPath>) -> Option<&str> {
        self.state.errors.first(&path.into().to_string())
    }

    /// First error for a field the user has interacted with
    ///
    /// Errors for untouched fields stay hidden until the first submit.
    pub fn visible_error(&self, path: impl Into<FieldPath>) -> Option<&str> {
        let path = path.into();
        if self.state.is_touched(&path) || self.state.is_submitted() {
            self.state.errors.first(&path.to_string())
        } else {
            None
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state.is_dirty()
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    /// Update one field and revalidate if the trigger policy says so
    ///
    /// Returns the published error mapping after the update.
    pub fn set_value(
        &mut self,
        path: impl Into<FieldPath>,
        value: impl Into<Value>,
    ) -> &ValidationErrors {
        let path = path.into();
        if self.write_value(&path, value.into()) {
            self.validate_now();
        }
        &self.state.errors
    }

    /// Mark a field as touched (focus left it)
    pub fn blur(&mut self, path: impl Into<FieldPath>) -> &ValidationErrors {
        let path = path.into();
        if self.touch(&path) {
            self.validate_now();
        }
        &self.state.errors
    }

    /// Validate the whole form now, regardless of trigger policy
    pub fn trigger(&mut self) -> bool {
        self.validate_now();
        self.state.errors.is_empty()
    }

    /// Validate the current value against the full schema
    ///
    /// On failure only the error mapping and the submit bookkeeping change.
    pub fn submit(&mut self) -> SubmitResult<T> {
        self.begin_submit();
        let result = self.schema.parse(&self.state.values, self.policy.criteria_mode);
        self.finish_submit(result)
    }

    /// Submit, hand a valid value to `on_valid`, and tell the user how it went
    ///
    /// The returned result is the validation outcome. A failing `on_valid`
    /// is reported through `notifier` and clears
    /// [`FormState::is_submit_successful`].
    pub fn handle_submit<F, E>(
        &mut self,
        notifier: &dyn Notifier,
        success_message: &str,
        on_valid: F,
    ) -> SubmitResult<T>
    where
        F: FnOnce(&T) -> Result<(), E>,
        E: fmt::Display,
    {
        let result = self.submit();

        match &result {
            SubmitResult::Valid(value) => match on_valid(value) {
                Ok(()) => notifier.notify(success_message, &NotifyOptions::success()),
                Err(e) => {
                    warn!(form_id = %self.id, error = %e, "submit handler failed");
                    self.state.is_submit_successful = false;
                    notifier.notify(
                        "Submission failed",
                        &NotifyOptions::error().description(e.to_string()),
                    );
                }
            },
            SubmitResult::Invalid(errors) => notifier.notify(
                "Please correct the highlighted fields",
                &NotifyOptions::warning()
                    .description(format!("{} field(s) need attention", errors.len())),
            ),
        }

        result
    }

    /// Back to the default values with a clean state
    pub fn reset(&mut self) {
        let defaults = self.state.defaults.clone();
        self.restart(defaults);
    }

    /// Replace the defaults and reset to them
    pub fn reset_to(&mut self, defaults: T) {
        let defaults = initial_values(self.id, Some(&defaults));
        self.restart(defaults);
    }

    fn restart(&mut self, defaults: FormValues) {
        let is_valid = self
            .schema
            .parse(&defaults, self.policy.criteria_mode)
            .is_ok();
        self.state = FormState::new(defaults, is_valid);
        debug!(form_id = %self.id, "form reset");
    }

    fn validate_now(&mut self) {
        let errors = self
            .schema
            .parse(&self.state.values, self.policy.criteria_mode)
            .err()
            .unwrap_or_default();
        self.publish(errors);
    }

    // Hooks shared with the async controller

    /// Store a value; true when the policy asks for a validation pass
    pub(crate) fn write_value(&mut self, path: &FieldPath, value: Value) -> bool {
        self.state.values.set(path, value);
        self.state.update_dirty(path);
        self.state.is_valid = self
            .schema
            .parse(&self.state.values, self.policy.criteria_mode)
            .is_ok();

        let validate = self.policy.should_validate(
            Trigger::Change,
            self.state.is_submitted(),
            self.state.is_touched(path),
        );
        debug!(form_id = %self.id, path = %path, validate, "value set");
        validate
    }

    /// Mark touched; true when the policy asks for a validation pass
    pub(crate) fn touch(&mut self, path: &FieldPath) -> bool {
        self.state.touched.insert(path.clone());
        self.policy
            .should_validate(Trigger::Blur, self.state.is_submitted(), true)
    }

    /// Validity is unknown until a full pass runs against the current value
    pub(crate) fn mark_unverified(&mut self) {
        self.state.is_valid = false;
    }

    pub(crate) fn publish(&mut self, errors: ValidationErrors) {
        debug!(form_id = %self.id, failed = errors.len(), "errors published");
        self.state.is_valid = errors.is_empty();
        self.state.errors = errors;
    }

    pub(crate) fn begin_submit(&mut self) {
        debug!(form_id = %self.id, "submit started");
        self.state.submits_in_flight += 1;
    }

    pub(crate) fn finish_submit(&mut self, result: Result<T, ValidationErrors>) -> SubmitResult<T> {
        self.state.submit_count += 1;
        self.state.submits_in_flight = self.state.submits_in_flight.saturating_sub(1);

        match result {
            Ok(value) => {
                self.publish(ValidationErrors::new());
                self.state.is_submit_successful = true;
                debug!(form_id = %self.id, "submit succeeded");
                SubmitResult::Valid(value)
            }
            Err(errors) => {
                self.publish(errors.clone());
                self.state.is_submit_successful = false;
                debug!(form_id = %self.id, failed = errors.len(), "submit rejected");
                SubmitResult::Invalid(errors)
            }
        }
    }

    pub(crate) fn policy(&self) -> Policy {
        self.policy
    }
}

impl<T> fmt::Debug for FormController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("id", &self.id)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish()
    }
}

/// Serialize the defaults; a value that cannot become JSON starts empty
fn initial_values<T: Serialize>(id: Uuid, defaults: Option<&T>) -> FormValues {
    match defaults {
        None => FormValues::new(),
        Some(defaults) => FormValues::from_typed(defaults).unwrap_or_else(|e| {
            warn!(form_id = %id, error = %e, "default values could not be serialized");
            FormValues::new()
        }),
    }
}
