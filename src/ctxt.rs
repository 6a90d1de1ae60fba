use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::loader::ModuleLoader;

/// Everything a compiler needs to know about the file being transformed.
#[derive(Clone, Copy)]
pub struct Ctx<'a> {
    pub config: &'a Config,
    pub loader: &'a dyn ModuleLoader,
    pub sink: &'a dyn DiagnosticSink,
    pub filename: &'a str,
    /// Full source text of the file.
    pub code: &'a str,
}
