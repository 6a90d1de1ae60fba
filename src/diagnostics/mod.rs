//! Diagnostics reported when a compilation failure is tolerated.

mod frame;

use std::cell::RefCell;

pub use frame::ErrorFormat;

/// Line and column of a diagnostic. Lines are 1-indexed, columns 0-indexed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub filename: String,
    /// Position of the failing template relative to the file. Module
    /// references carry none.
    pub relative: Option<Position>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            filename: filename.into(),
            relative: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.relative = Some(position);
        self
    }

    /// Formats the diagnostic with a source excerpt from `source`, the full
    /// text of the file it was reported for.
    pub fn render(&self, source: &str) -> String {
        let format = ErrorFormat::new(&self.message, source).filename(&self.filename);
        match self.relative {
            Some(position) => format.position(position).format(),
            None => format.format(),
        }
    }
}

/// Receives diagnostics. Reporting never fails.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs diagnostics as `tracing` errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.relative {
            Some(Position { line, column }) => tracing::error!(
                filename = %diagnostic.filename,
                line,
                column,
                "{}",
                diagnostic.message
            ),
            None => tracing::error!(filename = %diagnostic.filename, "{}", diagnostic.message),
        }
    }
}

/// Keeps diagnostics in memory so the host can surface them after the pass.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
