//! Inline compilation of CSS modules for SWC.
//!
//! This crate rewrites three forms that reference styles into expressions
//! produced by a [`CssProcessor`]:
//!
//! ```js
//! import styles from "./button.css";        // const styles = <compiled>;
//! const theme = require("./theme.css");     // const theme = <compiled>;
//! const title = css`color: ${accent};`;     // const title = <compiled>;
//! ```
//!
//! # Architecture
//!
//! Each compiler produces JavaScript source text, which the splice layer
//! parses and grafts into the tree in place of the matched node. Tagged
//! templates are rebuilt as CSS text with placeholder identifiers for their
//! interpolations, and the original interpolation nodes are moved into the
//! parsed result.
//!
//! # Failure policy
//!
//! With `throwOnError` the first failing module or template aborts the file.
//! Otherwise the failure goes to the [`DiagnosticSink`] and a fallback is
//! spliced in (`() => {}` for modules, `{}` for templates) so the rest of the
//! file is still transformed.
//!
//! ```ignore
//! use std::sync::Arc;
//! use css_modules_transform::{ConfigCell, FsLoader, PluginOptions, TracingSink, transform_source};
//!
//! let config = ConfigCell::global().get_or_init(&PluginOptions::default(), Arc::new(my_processor))?;
//! let output = transform_source(&code, "src/button.js", &config, &FsLoader::new(), &TracingSink)?;
//! ```

use std::io;
use std::path::PathBuf;

use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::{FileName, SourceMap, sync::Lrc};
use swc_core::ecma::ast::{EsVersion, Program};
use swc_core::ecma::codegen::{Config as CodegenConfig, Emitter, text_writer::JsWriter};
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax, lexer::Lexer};
use swc_core::ecma::visit::VisitMutWith;

mod config;
mod ctxt;
mod diagnostics;
mod error;
mod loader;
mod module_ref;
mod position;
mod processor;
mod splice;
mod template;
mod transform;

pub use config::{Config, ConfigCell, PluginOptions};
pub use ctxt::Ctx;
pub use diagnostics::{
    CollectingSink, Diagnostic, DiagnosticSink, ErrorFormat, Position, TracingSink,
};
pub use error::TransformError;
pub use loader::{FsLoader, MemoryLoader, ModuleLoader};
pub use module_ref::{MODULE_FALLBACK, compile_module_reference};
pub use position::{correct_position, measure_indent};
pub use processor::{CssProcessor, ProcessError};
pub use template::{
    CompiledTemplate, TEMPLATE_FALLBACK, TemplateInput, TemplateLiteral,
    compile_template_literal, parse_template_string,
};
pub use transform::CssModulesTransform;

/// Parses `source`, runs [`CssModulesTransform`] over it and prints the result.
///
/// Files ending in `.ts`, `.tsx`, `.mts` or `.cts` are parsed as TypeScript,
/// everything else as JavaScript with JSX.
pub fn transform_source(
    source: &str,
    filename: &str,
    config: &Config,
    loader: &dyn ModuleLoader,
    sink: &dyn DiagnosticSink,
) -> Result<String, TransformError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Real(PathBuf::from(filename)).into(),
        source.to_string(),
    );
    let comments = SingleThreadedComments::default();

    let lexer = Lexer::new(
        syntax_for(filename),
        EsVersion::latest(),
        StringInput::from(&*fm),
        Some(&comments as &dyn Comments),
    );
    let mut parser = Parser::new_from(lexer);
    let parse_error = |err: swc_core::ecma::parser::error::Error| TransformError::Parse {
        filename: filename.to_string(),
        message: format!("{err:?}"),
    };

    let mut program = parser.parse_program().map_err(parse_error)?;
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(parse_error(err));
    }

    let cx = Ctx {
        config,
        loader,
        sink,
        filename,
        code: source,
    };
    let mut transform = CssModulesTransform::new(cx, cm.clone());
    program.visit_mut_with(&mut transform);
    transform.finish()?;

    print_program(&cm, &comments, &program)
}

fn syntax_for(filename: &str) -> Syntax {
    let is_ts = [".ts", ".tsx", ".mts", ".cts"]
        .iter()
        .any(|ext| filename.ends_with(ext));

    if is_ts {
        Syntax::Typescript(TsSyntax {
            tsx: filename.ends_with(".tsx"),
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    }
}

fn print_program(
    cm: &Lrc<SourceMap>,
    comments: &SingleThreadedComments,
    program: &Program,
) -> Result<String, TransformError> {
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(cm.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: CodegenConfig::default(),
            cm: cm.clone(),
            comments: Some(comments as &dyn Comments),
            wr: writer,
        };
        emitter.emit_program(program).map_err(TransformError::Emit)?;
    }

    String::from_utf8(buf)
        .map_err(|err| TransformError::Emit(io::Error::new(io::ErrorKind::InvalidData, err)))
}
