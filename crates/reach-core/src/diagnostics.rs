//! Non-fatal findings collected while validating a network.
//!
//! Fatal topology problems are [`TopologyError`](crate::TopologyError)s. Everything
//! that is merely suspicious (an undeclared node, a network split into
//! islands, a line without parameters) lands here so callers can show it next
//! to the zone results.
//!
//! # Example
//!
//! ```
//! use reach_core::diagnostics::{Category, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.warn(Category::Topology, "Network is split into 2 islands");
//! diag.warn_about(Category::Parameters, "L3", "No impedance entered");
//!
//! assert_eq!(diag.warnings().count(), 2);
//! assert_eq!(diag.summary(), "2 warnings");
//! ```

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual, but zones can still be computed
    Warning,
    /// The network cannot be used as entered
    Error,
}

/// What part of the input an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Node declarations, connectivity, shared endpoint pairs
    Topology,
    /// Missing or unusable impedance and fault-current values
    Parameters,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Topology => "topology",
            Category::Parameters => "parameters",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Node or element the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{severity}:{}] {}", self.category, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, " ({subject})")?;
        }
        Ok(())
    }
}

/// Issues found for one network, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, category: Category, subject: Option<&str>, message: &str) {
        self.issues.push(DiagnosticIssue {
            severity,
            category,
            message: message.to_owned(),
            subject: subject.map(str::to_owned),
        });
    }

    pub fn warn(&mut self, category: Category, message: &str) {
        self.push(Severity::Warning, category, None, message);
    }

    pub fn warn_about(&mut self, category: Category, subject: &str, message: &str) {
        self.push(Severity::Warning, category, Some(subject), message);
    }

    pub fn error(&mut self, category: Category, message: &str) {
        self.push(Severity::Error, category, None, message);
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// Short count line such as `"2 warnings, 1 error"`.
    pub fn summary(&self) -> String {
        let counted = |n: usize, word: &str| format!("{n} {word}{}", if n == 1 { "" } else { "s" });
        match (self.count(Severity::Warning), self.count(Severity::Error)) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => counted(w, "warning"),
            (0, e) => counted(e, "error"),
            (w, e) => format!("{}, {}", counted(w, "warning"), counted(e, "error")),
        }
    }
}
