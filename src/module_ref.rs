//! Compilation of CSS modules named by imports and `require()` calls.

use crate::ctxt::Ctx;
use crate::diagnostics::Diagnostic;
use crate::error::TransformError;

/// Substituted for a module reference that failed to compile in lenient mode.
/// It is valid both where a value and where a callable is expected.
pub const MODULE_FALLBACK: &str = "() => {}";

/// Loads `resource_path` and compiles it into expression source text.
///
/// Failures propagate in strict mode. Otherwise they are reported with the
/// filename only and [`MODULE_FALLBACK`] is returned.
pub fn compile_module_reference(cx: &Ctx<'_>, resource_path: &str) -> Result<String, TransformError> {
    match load_and_process(cx, resource_path) {
        Ok(source) => Ok(source),
        Err(err) if cx.config.throw_on_error() => Err(err),
        Err(err) => {
            cx.sink.report(Diagnostic::new(err.to_string(), cx.filename));
            Ok(MODULE_FALLBACK.to_string())
        }
    }
}

fn load_and_process(cx: &Ctx<'_>, resource_path: &str) -> Result<String, TransformError> {
    let raw = cx
        .loader
        .load(cx.filename, resource_path)
        .map_err(|source| TransformError::Load {
            path: resource_path.to_string(),
            source,
        })?;

    Ok(cx.config.processor().process(cx.filename, &raw)?)
}
