//! Structured diagnostics returned across the engine boundary.
//!
//! The declarative engine consumes an ordered list of (severity, summary,
//! detail) records rather than bare errors, so non-fatal conditions — a
//! trigger that converged into its error status, for instance — can ride
//! along with otherwise successful reads.

use std::error::Error;

/// Severity of a single diagnostic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    /// The operation carried on; the engine should surface the message.
    Warning,
    /// The operation failed.
    Error,
}

/// A single engine-facing message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// Severity of the message.
    pub severity: Severity,
    /// Short, one-line summary.
    pub summary: String,
    /// Longer free-form detail; may be empty.
    pub detail: String,
}

impl Diagnostic {
    /// Builds an error diagnostic from a summary.
    #[must_use]
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: String::new(),
        }
    }

    /// Builds a warning diagnostic from a summary.
    #[must_use]
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: String::new(),
        }
    }

    /// Attaches detail text.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// Ordered list of diagnostics produced by one CRUD entry point.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any diagnostic has [`Severity::Error`].
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.0
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// Iterates over the diagnostics in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Conversion of error values into the engine's diagnostics list.
pub trait IntoDiagnostics {
    /// Converts the value into a diagnostics list.
    fn into_diagnostics(self) -> Diagnostics;
}

impl<E: Error> IntoDiagnostics for E {
    fn into_diagnostics(self) -> Diagnostics {
        let mut detail = String::new();
        let mut source = self.source();
        while let Some(cause) = source {
            if !detail.is_empty() {
                detail.push_str(": ");
            }
            detail.push_str(&cause.to_string());
            source = cause.source();
        }
        Diagnostics::from(Diagnostic::error(self.to_string()).with_detail(detail))
    }
}
