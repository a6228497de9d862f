//! formbind validation functions
//!
//! Pure field-level checks used by the schema rules in `formbind`.
//! Every function either answers a yes/no question (`is_*`) or returns
//! `Result<(), String>` where the error is a user-facing message.

pub mod collection;
pub mod email;
pub mod numeric;
pub mod password;
pub mod string;

// Re-export all validators
pub use collection::*;
pub use email::*;
pub use numeric::*;
pub use password::*;
pub use string::*;
