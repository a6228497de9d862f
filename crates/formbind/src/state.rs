//! Form state owned by one controller

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use crate::errors::ValidationErrors;
use crate::path::FieldPath;
use crate::values::FormValues;

/// Snapshot of a form
///
/// `errors` is only ever replaced wholesale by the output of a schema pass;
/// there is no way to edit individual entries.
pub struct FormState<T> {
    pub(crate) values: FormValues,
    pub(crate) defaults: FormValues,
    pub(crate) errors: ValidationErrors,
    pub(crate) touched: BTreeSet<FieldPath>,
    pub(crate) dirty: BTreeSet<FieldPath>,
    pub(crate) is_valid: bool,
    /// Submits started and not yet finished
    pub(crate) submits_in_flight: u32,
    pub(crate) is_submit_successful: bool,
    pub(crate) submit_count: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> FormState<T> {
    pub(crate) fn new(defaults: FormValues, is_valid: bool) -> Self {
        Self {
            values: defaults.clone(),
            defaults,
            errors: ValidationErrors::new(),
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            is_valid,
            submits_in_flight: 0,
            is_submit_successful: false,
            submit_count: 0,
            _marker: PhantomData,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn default_values(&self) -> &FormValues {
        &self.defaults
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn touched_fields(&self) -> &BTreeSet<FieldPath> {
        &self.touched
    }

    pub fn dirty_fields(&self) -> &BTreeSet<FieldPath> {
        &self.dirty
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    /// Current values differ from the defaults
    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    /// Whether the current values satisfy the schema, independent of whether
    /// errors have been published yet
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// True while any submit is still running
    pub fn is_submitting(&self) -> bool {
        self.submits_in_flight > 0
    }

    pub fn is_submitted(&self) -> bool {
        self.submit_count > 0
    }

    pub fn is_submit_successful(&self) -> bool {
        self.is_submit_successful
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    /// Recompute dirtiness after a write to `path`
    ///
    /// A write can change paths above or below it, so every tracked path is
    /// rechecked.
    pub(crate) fn update_dirty(&mut self, path: &FieldPath) {
        self.dirty.insert(path.clone());
        self.dirty
            .retain(|p| self.values.get(p) != self.defaults.get(p));
    }
}

impl<T> Clone for FormState<T> {
    fn clone(&self) -> Self {
        Self {
            values: self.values.clone(),
            defaults: self.defaults.clone(),
            errors: self.errors.clone(),
            touched: self.touched.clone(),
            dirty: self.dirty.clone(),
            is_valid: self.is_valid,
            submits_in_flight: self.submits_in_flight,
            is_submit_successful: self.is_submit_successful,
            submit_count: self.submit_count,
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for FormState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && self.defaults == other.defaults
            && self.errors == other.errors
            && self.touched == other.touched
            && self.dirty == other.dirty
            && self.is_valid == other.is_valid
            && self.submits_in_flight == other.submits_in_flight
            && self.is_submit_successful == other.is_submit_successful
            && self.submit_count == other.submit_count
    }
}

impl<T> fmt::Debug for FormState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("touched", &self.touched)
            .field("dirty", &self.dirty)
            .field("is_valid", &self.is_valid)
            .field("submits_in_flight", &self.submits_in_flight)
            .field("submit_count", &self.submit_count)
            .finish()
    }
}
