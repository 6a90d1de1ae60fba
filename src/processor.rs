use std::fmt;

use thiserror::Error;

use crate::diagnostics::Position;

/// Failure raised by a [`CssProcessor`].
///
/// `position` is where the processor located the problem in the CSS text it
/// was given. It is appended to the message; diagnostics keep pointing at the
/// referencing file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ProcessError {
    pub message: String,
    pub position: Option<Position>,
}

impl ProcessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(Position { line, column }) => write!(f, "{} ({line}:{column})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Compiles CSS source into JavaScript expression source text.
///
/// `filename` is the file that references the styles. `source` is either the
/// raw contents of a CSS module or the reconstructed text of a tagged template,
/// in which case interpolations show up as placeholder identifiers that must be
/// passed through untouched (inside string literals or as bare identifiers).
///
/// The returned text must parse as a standalone expression.
pub trait CssProcessor: Send + Sync {
    fn process(&self, filename: &str, source: &str) -> Result<String, ProcessError>;
}

impl<F> CssProcessor for F
where
    F: Fn(&str, &str) -> Result<String, ProcessError> + Send + Sync,
{
    fn process(&self, filename: &str, source: &str) -> Result<String, ProcessError> {
        self(filename, source)
    }
}
