//! Field name comparison and name transformation.

use serde::{Deserialize, Serialize};

/// Case-insensitive name equality.
///
/// ASCII names are compared without allocating; other names fall back to
/// full Unicode lowercasing.
pub fn names_equal(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        a.eq_ignore_ascii_case(b)
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

/// A global `(pattern, replacement)` pair applied to target names that do
/// not resolve as they are.
///
/// The pattern is matched literally and every occurrence is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameTransformation {
    pub pattern: String,
    pub replacement: String,
}

impl NameTransformation {
    /// Create a new name transformation.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply the transformation to `name`. An empty pattern leaves the name unchanged.
    pub fn apply(&self, name: &str) -> String {
        if self.pattern.is_empty() {
            return name.to_string();
        }
        name.replace(&self.pattern, &self.replacement)
    }
}
