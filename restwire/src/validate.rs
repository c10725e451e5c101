//! Structural validation of bound input values
//!
//! Validation is a capability the pipeline consumes: after binding, the
//! input's [`Validate`] implementation reports field-level rule violations
//! and the classifier turns them into a 400 response whose `details` map
//! field names to the violated rule. Types without rules use the default
//! no-op implementation.
//!
//! # Example
//!
//! ```rust
//! use restwire::validate::{rules, Checks, FieldError, Validate};
//!
//! struct CreateUser {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Validate for CreateUser {
//!     fn validate(&self) -> Result<(), Vec<FieldError>> {
//!         Checks::new()
//!             .check("name", "required", rules::non_empty(&self.name))
//!             .check("age", "range", rules::in_range(self.age, 0, 150))
//!             .finish()
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One violated rule on one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as exposed to callers
    pub field: String,
    /// Name of the violated rule, e.g. `required`
    pub rule: String,
}

impl FieldError {
    /// Create a field error
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }
}

/// Capability trait: report rule violations on a bound value
pub trait Validate {
    /// Validate the value, listing every violated field rule
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

/// Validation outcome carried through the pipeline to the classifier
#[derive(Debug, Error)]
#[error("validation failed for {} field(s)", errors.len())]
pub struct ValidationFailure {
    /// Every violated field rule
    pub errors: Vec<FieldError>,
}

impl From<Vec<FieldError>> for ValidationFailure {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

/// Accumulates rule checks for a `Validate` implementation
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    /// Start an empty check list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation when `ok` is false
    #[must_use]
    pub fn check(mut self, field: &str, rule: &str, ok: bool) -> Self {
        if !ok {
            self.errors.push(FieldError::new(field, rule));
        }
        self
    }

    /// Finish, returning every recorded violation
    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Reusable rule predicates
pub mod rules {
    /// Non-empty after trimming
    pub fn non_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Character length within `[min, max]`
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        len >= min && len <= max
    }

    /// Value within `[min, max]`
    pub fn in_range<T: PartialOrd>(value: T, min: T, max: T) -> bool {
        value >= min && value <= max
    }
}
