//! Position correction for diagnostics raised inside style templates.

use crate::diagnostics::Position;

/// Width of the indentation of the first non-blank line in `text`.
///
/// Every leading whitespace character counts as one column, tabs included.
pub fn measure_indent(text: &str) -> usize {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .unwrap_or(0)
}

/// Position to report for a failure in a template whose static text is
/// `joined` and whose node starts on `start_line`.
///
/// Templates usually open with a newline right after the backtick. When the
/// text starts with a blank line the reported line is one above the node's
/// start line, since processors count that blank line as their first line.
pub fn correct_position(joined: &str, start_line: usize) -> Position {
    let line = if opens_with_blank_line(joined) {
        start_line.saturating_sub(1)
    } else {
        start_line
    };

    Position {
        line,
        column: measure_indent(joined),
    }
}

fn opens_with_blank_line(text: &str) -> bool {
    let content = text
        .find(|c: char| !c.is_whitespace())
        .unwrap_or(text.len());
    text[..content].contains('\n')
}
