//! Constraint validation for adapter configuration
//!
//! Validation never stops at the first problem: every rule is checked and every
//! violation is collected so that a single report lists all of them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single failed rule, located by a dotted path into the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub path: String,
    pub message: String,
}

impl ConstraintViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adapter Validation Error: [{}]=[{}]", self.path, self.message)
    }
}

/// Every violation found in one configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    violations: Vec<ConstraintViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<ConstraintViolation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[ConstraintViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<ConstraintViolation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates violations while walking a configuration tree
#[derive(Debug, Default)]
pub struct Violations {
    found: Vec<ConstraintViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.found.push(ConstraintViolation::new(path, message));
    }

    /// Record a violation when `value` is missing or only whitespace
    pub fn require_non_blank(&mut self, path: &str, value: Option<&str>) {
        match value {
            None => self.add(path, "may not be null"),
            Some(v) if v.trim().is_empty() => self.add(path, "may not be blank"),
            Some(_) => {}
        }
    }

    /// Record a violation for each id that appears more than once among siblings
    pub fn require_unique<'a, I>(&mut self, path: &str, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for id in ids {
            if !seen.insert(id) && reported.insert(id) {
                self.add(path, format!("duplicate uniqueId {id}"));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.found.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.found))
        }
    }
}

/// Types that can check their own constraints
pub trait Validate {
    /// Append every violation under `path` to `violations`
    fn collect_violations(&self, path: &str, violations: &mut Violations);

    fn validate(&self, path: &str) -> Result<(), ValidationError> {
        let mut violations = Violations::new();
        self.collect_violations(path, &mut violations);
        violations.into_result()
    }
}

/// Join a parent path and a child segment
pub fn child_path(parent: &str, child: impl fmt::Display) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_violation() {
        let error = ValidationError::new(vec![
            ConstraintViolation::new("uniqueId", "may not be null"),
            ConstraintViolation::new("channels[0].uniqueId", "may not be blank"),
        ]);
        assert_eq!(
            error.to_string(),
            "Adapter Validation Error: [uniqueId]=[may not be null]\n\
             Adapter Validation Error: [channels[0].uniqueId]=[may not be blank]"
        );
    }

    #[test]
    fn test_require_non_blank() {
        let mut violations = Violations::new();
        violations.require_non_blank("a", None);
        violations.require_non_blank("b", Some("  "));
        violations.require_non_blank("c", Some("ok"));

        let error = violations.into_result().unwrap_err();
        assert_eq!(error.len(), 2);
        assert_eq!(error.violations()[0].message, "may not be null");
        assert_eq!(error.violations()[1].message, "may not be blank");
    }

    #[test]
    fn test_require_unique_reports_each_duplicate_once() {
        let mut violations = Violations::new();
        violations.require_unique("channels", ["a", "b", "a", "a"]);
        let error = violations.into_result().unwrap_err();
        assert_eq!(error.len(), 1);
        assert!(error.violations()[0].message.contains("duplicate uniqueId a"));
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("", "uniqueId"), "uniqueId");
        assert_eq!(child_path("channels[0]", "uniqueId"), "channels[0].uniqueId");
    }
}
