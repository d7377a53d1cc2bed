//! Provides definitions for diagnostics, which are the errors and warnings
//! associated with compilation.
//!
//! There exist crates that make this easy, but they assume a particular
//! rendering target. Keeping the definition here lets the command line
//! renderer and the tests each consume diagnostics their own way.

use pasc_problems::Problem;

use crate::core::{FileId, SourceSpan};

/// How severe a diagnostic is.
///
/// Any `Error` diagnostic marks the compilation as failed. `Warning` is
/// reported but does not prevent code generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A label that refers to some range in a file along with a message
/// describing that range.
///
/// Normally this indicates the location of an error or warning.
#[derive(Debug)]
pub struct Label {
    /// Byte range of the label in the file.
    pub start: usize,
    pub end: usize,

    /// Identifier for the file.
    pub file_id: FileId,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    pub fn span(span: &SourceSpan, message: impl Into<String>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            file_id: span.file_id.clone(),
            message: message.into(),
        }
    }
}

/// A diagnostic: a problem code, a severity, and a primary location.
#[derive(Debug)]
pub struct Diagnostic {
    /// The stable code describing the type of diagnostic.
    pub code: &'static str,

    description: &'static str,

    pub severity: Severity,

    /// The location the diagnostic points at.
    pub primary: Label,
}

impl Diagnostic {
    /// Creates an error diagnostic from the problem code with the specified
    /// label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code(),
            description: problem.message(),
            severity: Severity::Error,
            primary,
        }
    }

    /// Creates a warning diagnostic from the problem code with the specified
    /// label.
    pub fn warning(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code(),
            description: problem.message(),
            severity: Severity::Warning,
            primary,
        }
    }

    /// Returns the constant description for the diagnostic's problem class.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// An ordered collection of diagnostics produced by one compilation.
///
/// The parser aborts on the first error, so in practice the set holds at
/// most one error, possibly preceded by lexical errors and warnings that
/// were recovered from.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// True if any error-level diagnostic was reported. Warnings alone do
    /// not fail a compilation.
    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_errors_when_empty_then_false() {
        assert!(!Diagnostics::new().has_errors());
    }

    #[test]
    fn has_errors_when_only_warning_then_false() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::warning(
            Problem::TrailingContent,
            Label::span(&SourceSpan::range(10, 12), "content after the program"),
        ));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn has_errors_when_error_then_true() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::problem(
            Problem::UnknownSymbol,
            Label::span(&SourceSpan::range(0, 3), "FOO is not declared"),
        ));
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 1);
    }
}
