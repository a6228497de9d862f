//! Forms whose schema includes asynchronous rules
//!
//! Some checks need to wait (a remote "is this username taken?" lookup). An
//! [`AsyncFormController`] serializes validation passes so at most one is in
//! flight, and every `set_value` bumps a generation counter: a pass that
//! started against an older value is cancelled and its result discarded.
//!
//! The sync schema alone cannot vouch for a value, so while async rules are
//! registered `is_valid` only turns true through a completed pass.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, Mutex, MutexGuard};
use tracing::debug;

use crate::controller::{FormController, SubmitResult};
use crate::errors::ValidationErrors;
use crate::options::FormOptions;
use crate::path::FieldPath;
use crate::schema::Schema;
use crate::state::FormState;
use crate::values::FormValues;

/// A check that may suspend, bound to one field
#[async_trait]
pub trait AsyncRule: Send + Sync {
    /// `Err` carries the message shown for the field
    async fn check(&self, values: &FormValues) -> Result<(), String>;
}

/// A synchronous schema plus async rules keyed by field
pub struct AsyncSchema<T> {
    schema: Arc<Schema<T>>,
    rules: Vec<(FieldPath, Arc<dyn AsyncRule>)>,
}

impl<T> AsyncSchema<T> {
    pub fn new(schema: Arc<Schema<T>>) -> Self {
        Self {
            schema,
            rules: Vec::new(),
        }
    }

    /// Add a rule for `path`; it only runs when the field passed its sync rules
    pub fn rule(mut self, path: impl Into<FieldPath>, rule: impl AsyncRule + 'static) -> Self {
        self.rules.push((path.into(), Arc::new(rule)));
        self
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }
}

impl<T> Clone for AsyncSchema<T> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            rules: self.rules.clone(),
        }
    }
}

/// What happened to the validation pass a call started
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The pass finished and its errors were published
    Validated(ValidationErrors),
    /// The trigger policy did not call for a pass
    Skipped,
    /// A newer value arrived while the pass was running; nothing was published
    Superseded,
}

struct Shared<T> {
    form: Mutex<FormController<T>>,
    rules: Vec<(FieldPath, Arc<dyn AsyncRule>)>,
    generation: watch::Sender<u64>,
    pass: Mutex<()>,
}

/// Cloneable handle to one form; clones share the same state
pub struct AsyncFormController<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for AsyncFormController<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> AsyncFormController<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(schema: AsyncSchema<T>, options: FormOptions<T>) -> Self {
        let (generation, _) = watch::channel(0);
        let mut form = FormController::new(schema.schema, options);
        if !schema.rules.is_empty() {
            form.mark_unverified();
        }
        Self {
            shared: Arc::new(Shared {
                form: Mutex::new(form),
                rules: schema.rules,
                generation,
                pass: Mutex::new(()),
            }),
        }
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> FormState<T> {
        self.shared.form.lock().await.state().clone()
    }

    pub async fn values(&self) -> FormValues {
        self.shared.form.lock().await.values().clone()
    }

    pub async fn errors(&self) -> ValidationErrors {
        self.shared.form.lock().await.errors().clone()
    }

    pub async fn set_value(
        &self,
        path: impl Into<FieldPath>,
        value: impl Into<Value>,
    ) -> ValidationOutcome {
        let path = path.into();
        let (generation, validate) = {
            let mut form = self.shared.form.lock().await;
            let validate = form.write_value(&path, value.into());
            if !self.shared.rules.is_empty() {
                form.mark_unverified();
            }
            // Bumped under the form lock so values and generation move together
            self.shared.generation.send_modify(|g| *g += 1);
            (*self.shared.generation.borrow(), validate)
        };

        if !validate {
            return ValidationOutcome::Skipped;
        }
        self.validate_and_publish(generation).await
    }

    pub async fn blur(&self, path: impl Into<FieldPath>) -> ValidationOutcome {
        let path = path.into();
        let (generation, validate) = {
            let mut form = self.shared.form.lock().await;
            (*self.shared.generation.borrow(), form.touch(&path))
        };

        if !validate {
            return ValidationOutcome::Skipped;
        }
        self.validate_and_publish(generation).await
    }

    /// Validate against the full schema, async rules included
    ///
    /// Waits for any pass already in flight. If the value changes while this
    /// submit is validating, the stale pass is dropped and the newest value
    /// is validated instead.
    pub async fn submit(&self) -> SubmitResult<T> {
        self.shared.form.lock().await.begin_submit();

        loop {
            let generation = *self.shared.generation.borrow();
            if let Some((result, mut form)) = self.run_pass(generation).await {
                return form.finish_submit(result);
            }
            debug!(generation, "submit pass superseded, retrying");
        }
    }

    async fn validate_and_publish(&self, generation: u64) -> ValidationOutcome {
        match self.run_pass(generation).await {
            Some((result, mut form)) => {
                let errors = result.err().unwrap_or_default();
                form.publish(errors.clone());
                ValidationOutcome::Validated(errors)
            }
            None => ValidationOutcome::Superseded,
        }
    }

    /// One full pass for `generation`
    ///
    /// Returns the result together with the form lock, taken after confirming
    /// the generation is still current, so the caller can publish without a
    /// newer value slipping in. `None` means the pass went stale.
    async fn run_pass(
        &self,
        generation: u64,
    ) -> Option<(Result<T, ValidationErrors>, MutexGuard<'_, FormController<T>>)> {
        let _pass = self.shared.pass.lock().await;
        let receiver = self.shared.generation.subscribe();

        let (values, sync_result) = {
            let form = self.shared.form.lock().await;
            if *receiver.borrow() != generation {
                return None;
            }
            let values = form.values().clone();
            let result = form.schema().parse(&values, form.policy().criteria_mode);
            (values, result)
        };

        let async_errors = tokio::select! {
            errors = self.run_async_rules(&values, sync_result.as_ref().err()) => errors,
            _ = superseded(receiver, generation) => {
                debug!(generation, "validation pass cancelled");
                return None;
            }
        };

        let form = self.shared.form.lock().await;
        if *self.shared.generation.borrow() != generation {
            return None;
        }

        let result = match (sync_result, async_errors.is_empty()) {
            (Ok(value), true) => Ok(value),
            (Ok(_), false) => Err(async_errors),
            (Err(mut errors), _) => {
                errors.merge(async_errors);
                Err(errors)
            }
        };
        Some((result, form))
    }

    /// Async rules run one after another, in declaration order
    async fn run_async_rules(
        &self,
        values: &FormValues,
        sync_errors: Option<&ValidationErrors>,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        for (path, rule) in &self.shared.rules {
            let key = path.to_string();
            if sync_errors.is_some_and(|e| e.contains(&key)) || errors.contains(&key) {
                continue;
            }
            if let Err(message) = rule.check(values).await {
                errors.add(key, message);
            }
        }

        errors
    }
}

impl<T> fmt::Debug for AsyncFormController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFormController")
            .field("generation", &*self.shared.generation.borrow())
            .field("async_rules", &self.shared.rules.len())
            .finish()
    }
}

/// Resolves once the generation moves past `generation`
async fn superseded(mut receiver: watch::Receiver<u64>, generation: u64) {
    while receiver.changed().await.is_ok() {
        if *receiver.borrow_and_update() != generation {
            return;
        }
    }
    // Sender gone: nothing can supersede this pass anymore
    std::future::pending::<()>().await
}
