//! Required-field validation for submitted courses.

use serde::{Deserialize, Serialize};

use crate::catalog::Course;

/// Which course fields must be non-empty for a submission to be accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredFieldPolicy {
    /// Only `code` and `name`.
    #[default]
    Minimal,
    /// All nine fields.
    Strict,
}

impl RequiredFieldPolicy {
    /// Names of the required fields, in declaration order.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            RequiredFieldPolicy::Minimal => &Course::FIELDS[..2],
            RequiredFieldPolicy::Strict => &Course::FIELDS,
        }
    }
}

/// Checks courses against a [`RequiredFieldPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    policy: RequiredFieldPolicy,
}

impl Validator {
    pub fn new(policy: RequiredFieldPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RequiredFieldPolicy {
        self.policy
    }

    /// Return the names of required fields that are empty or whitespace.
    /// An empty result means the course is valid.
    pub fn validate(&self, course: &Course) -> Vec<&'static str> {
        self.policy
            .required_fields()
            .iter()
            .copied()
            .filter(|field| course.field(field).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }
}
