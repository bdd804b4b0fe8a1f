//! Course record type.

use serde::{Deserialize, Serialize};

/// A single course in the catalog.
///
/// Every field is a plain string. Keys absent from a submitted form or from
/// the persisted JSON deserialize as empty strings; presence is checked by
/// the validator, not by the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    /// Catalog key, e.g. "CS101".
    pub code: String,
    pub name: String,
    pub instructor: String,
    pub semester: String,
    pub schedule: String,
    pub classroom: String,
    pub prerequisites: String,
    pub grading: String,
    pub description: String,
}

impl Course {
    /// Field names in declaration order.
    pub const FIELDS: [&'static str; 9] = [
        "code",
        "name",
        "instructor",
        "semester",
        "schedule",
        "classroom",
        "prerequisites",
        "grading",
        "description",
    ];

    /// Shorthand for a course with only the key fields filled in.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Look up a field value by its serialized name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "code" => &self.code,
            "name" => &self.name,
            "instructor" => &self.instructor,
            "semester" => &self.semester,
            "schedule" => &self.schedule,
            "classroom" => &self.classroom,
            "prerequisites" => &self.prerequisites,
            "grading" => &self.grading,
            "description" => &self.description,
            _ => return None,
        };
        Some(value.as_str())
    }
}
