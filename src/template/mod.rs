//! Compilation of tagged style templates.
//!
//! ```js
//! const styles = css`
//!   .title { color: ${theme.accent}; }
//! `;
//! ```
//!
//! The static text is joined with a placeholder standing in for each
//! interpolation and handed to the configured [`CssProcessor`]. Placeholders
//! inside template literals in the processor's output become substitutions; the
//! splice layer later swaps every placeholder identifier and string fragment
//! for the original interpolation expression.

mod hole;


use swc_core::ecma::ast::Expr;

use crate::ctxt::Ctx;
use crate::diagnostics::Diagnostic;
use crate::error::TransformError;
use crate::position::correct_position;
use crate::processor::{CssProcessor, ProcessError};

pub(crate) use hole::{Segment, hole_index, split_holes};

/// Substituted for a template that failed to compile in lenient mode.
pub const TEMPLATE_FALLBACK: &str = "{}";

/// A tagged template literal as seen by the compiler.
pub struct TemplateLiteral<'a> {
    /// Cooked text of each quasi, in source order.
    pub strings: Vec<String>,
    /// Interpolated expressions; one fewer than `strings`.
    pub interpolations: &'a [Box<Expr>],
    /// Line of the template's first character in the file, 1-indexed.
    pub start_line: usize,
}

/// Expression source text produced for a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    pub source: String,
    /// Prefix of the placeholder identifiers left in `source`.
    pub hole_prefix: String,
}

impl CompiledTemplate {
    fn fallback() -> Self {
        Self {
            source: TEMPLATE_FALLBACK.to_string(),
            hole_prefix: String::new(),
        }
    }
}

/// Input of [`parse_template_string`].
pub struct TemplateInput<'a> {
    pub strings: &'a [String],
    pub interpolations: &'a [Box<Expr>],
    /// Full source text of the file; placeholders never collide with it.
    pub code: &'a str,
    pub from: &'a str,
    pub processor: &'a dyn CssProcessor,
}

/// Compiles the template tagged with `tag`.
///
/// Returns `Ok(None)` when `tag` is not the configured namespace. In lenient
/// mode a processor failure is reported at the corrected template position and
/// the template compiles to [`TEMPLATE_FALLBACK`].
pub fn compile_template_literal(
    cx: &Ctx<'_>,
    tag: &str,
    literal: &TemplateLiteral<'_>,
) -> Result<Option<CompiledTemplate>, TransformError> {
    if tag != cx.config.namespace() {
        return Ok(None);
    }

    let input = TemplateInput {
        strings: &literal.strings,
        interpolations: literal.interpolations,
        code: cx.code,
        from: cx.filename,
        processor: cx.config.processor(),
    };

    match parse_template_string(&input) {
        Ok(compiled) => Ok(Some(compiled)),
        Err(err) if cx.config.throw_on_error() => Err(err.into()),
        Err(err) => {
            let joined = literal.strings.concat();
            let position = correct_position(&joined, literal.start_line);
            cx.sink
                .report(Diagnostic::new(err.to_string(), cx.filename).at(position));
            Ok(Some(CompiledTemplate::fallback()))
        }
    }
}

/// Runs the processor over the template text and prepares its output for
/// splicing.
pub fn parse_template_string(input: &TemplateInput<'_>) -> Result<CompiledTemplate, ProcessError> {
    debug_assert_eq!(input.strings.len(), input.interpolations.len() + 1);

    let hole_prefix = hole::unique_prefix(input.code);
    let count = input.interpolations.len();
    let css = hole::interleave(input.strings, count, &hole_prefix);

    let output = input.processor.process(input.from, &css)?;

    Ok(CompiledTemplate {
        source: hole::embed_holes(&output, &hole_prefix, count),
        hole_prefix,
    })
}
