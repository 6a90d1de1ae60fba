//! rustc-style rendering of a diagnostic against its source file.

use super::Position;

const MAX_LINE_LEN: usize = 80;
const CONTEXT_CHARS: usize = 30;
const TAB_WIDTH: usize = 4;

/// Configuration for formatting an error with source context.
pub struct ErrorFormat<'a> {
    /// The error message, e.g. "unexpected token"
    pub message: &'a str,
    /// Full text of the file
    pub source: &'a str,
    pub filename: &'a str,
    pub position: Option<Position>,
    pub help: Option<&'a str>,
}

impl<'a> ErrorFormat<'a> {
    pub fn new(message: &'a str, source: &'a str) -> Self {
        Self {
            message,
            source,
            filename: "input",
            position: None,
            help: None,
        }
    }

    pub fn filename(mut self, filename: &'a str) -> Self {
        self.filename = filename;
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn help(mut self, help: &'a str) -> Self {
        self.help = Some(help);
        self
    }

    /// Formats the error.
    ///
    /// ```text
    /// error: message
    ///  --> file:line:column
    /// N | source line content
    ///   |     ^
    /// help: suggestion
    /// ```
    ///
    /// The excerpt is omitted when there is no position or the line is out of
    /// range.
    pub fn format(&self) -> String {
        let mut msg = format!("error: {}\n", self.message);

        let Some(position) = self.position else {
            msg.push_str(&format!(" --> {}\n", self.filename));
            self.push_help(&mut msg);
            return msg;
        };

        msg.push_str(&format!(
            " --> {}:{}:{}\n",
            self.filename, position.line, position.column
        ));

        if let Some(line_content) = position
            .line
            .checked_sub(1)
            .and_then(|index| self.source.lines().nth(index))
        {
            let (display_content, caret_col) = excerpt(line_content, position.column);
            let width = position.line.to_string().len();

            msg.push_str(&format!(
                "{:>width$} | {}\n",
                position.line, display_content
            ));
            msg.push_str(&format!("{:>width$} | {:>caret_col$}^\n", "", ""));
        }

        self.push_help(&mut msg);
        msg
    }

    fn push_help(&self, msg: &mut String) {
        if let Some(help) = self.help {
            msg.push_str(&format!("help: {help}\n"));
        }
    }
}

/// Trims and, for long lines, windows `line` around `column`. Returns the text
/// to display and the caret offset within it.
fn excerpt(line: &str, column: usize) -> (String, usize) {
    let expanded = line.replace('\t', &" ".repeat(TAB_WIDTH));

    let visual_column: usize = line
        .chars()
        .take(column)
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum();

    let leading_spaces = expanded.len() - expanded.trim_start().len();
    let trimmed = expanded.trim().to_string();
    let column = visual_column.saturating_sub(leading_spaces);

    if trimmed.chars().count() <= MAX_LINE_LEN {
        return (trimmed, column);
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let start = column.saturating_sub(CONTEXT_CHARS).min(chars.len());
    let end = (column + CONTEXT_CHARS).min(chars.len());

    let prefix = if start > 0 { "..." } else { "" };
    let suffix = if end < chars.len() { "..." } else { "" };
    let snippet: String = chars[start..end].iter().collect();

    (
        format!("{prefix}{snippet}{suffix}"),
        column - start + prefix.len(),
    )
}
