//! # formbind
//!
//! Binds a declarative validation [`Schema`] to a mutable form state and hands
//! back a [`FormController`] that reads and writes field values, validates them
//! according to a trigger policy, and submits them as a fully typed value.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use formbind::{FormController, FormOptions, Schema, SubmitResult};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize, PartialEq)]
//! struct Order {
//!     quantity: u32,
//! }
//!
//! let schema = Arc::new(
//!     Schema::<Order>::builder()
//!         .field("quantity", |f| f.required().integer().positive())
//!         .build(),
//! );
//!
//! let mut form = FormController::new(schema, FormOptions::default());
//! form.set_value("quantity", -1);
//! assert!(form.submit().is_invalid());
//!
//! form.set_value("quantity", 3);
//! assert_eq!(form.submit(), SubmitResult::Valid(Order { quantity: 3 }));
//! ```
//!
//! ## Architecture
//!
//! - [`schema`] - rules per field plus cross-field checks, frozen at `build()`
//! - [`controller`] - the synchronous controller and [`SubmitResult`]
//! - [`async_controller`] - async rules, serialized passes, stale-pass cancellation
//! - [`state`] / [`options`] - form state snapshot and trigger policy
//! - [`config`] / [`notifier`] - application configuration and user feedback
//!
//! Field-level checks live in the `formbind-validation` crate.

pub mod async_controller;
pub mod config;
pub mod controller;
pub mod errors;
pub mod notifier;
pub mod options;
pub mod path;
pub mod schema;
pub mod state;
pub mod values;

pub use async_controller::{AsyncFormController, AsyncRule, AsyncSchema, ValidationOutcome};
pub use config::AppConfig;
pub use controller::{FormController, SubmitResult};
pub use errors::{ValidationErrors, FORM_ERROR_KEY};
pub use notifier::{LogNotifier, NotificationKind, Notifier, NotifyOptions};
pub use options::{CriteriaMode, FormOptions, RevalidateMode, ValidationMode};
pub use path::{FieldPath, Segment};
pub use schema::{FieldBuilder, Schema, SchemaBuilder};
pub use state::FormState;
pub use values::FormValues;

pub use formbind_validation as validation;
