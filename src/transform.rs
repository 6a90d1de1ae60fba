//! The SWC pass that finds CSS references and splices compiled expressions in
//! their place.

use std::mem;

use swc_core::common::{SourceMap, SyntaxContext, sync::Lrc};
use swc_core::ecma::ast::{
    BindingIdent, CallExpr, Callee, Decl, Expr, ImportDecl, ImportSpecifier, Lit, ModuleDecl,
    ModuleItem, Pat, Stmt, TaggedTpl, VarDecl, VarDeclKind, VarDeclarator,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith, noop_visit_mut_type};

use crate::ctxt::Ctx;
use crate::error::TransformError;
use crate::module_ref::compile_module_reference;
use crate::splice::{graft_holes, parse_expr};
use crate::template::{TemplateLiteral, compile_template_literal};

/// Rewrites, in one traversal of a program:
///
/// - `import x from "./a.css"` into `const x = <compiled>;`
/// - `require("./a.css")` into `<compiled>`
/// - ``css`...` `` into `<compiled>`, with interpolations moved into the result
///
/// A strict-mode failure or generated code that does not parse stops the pass;
/// the error is returned by [`CssModulesTransform::finish`].
pub struct CssModulesTransform<'a> {
    cx: Ctx<'a>,
    cm: Lrc<SourceMap>,
    failure: Option<TransformError>,
}

impl<'a> CssModulesTransform<'a> {
    /// `cm` must be the source map the program was parsed with; it is used to
    /// find the line of each template.
    pub fn new(cx: Ctx<'a>, cm: Lrc<SourceMap>) -> Self {
        Self {
            cx,
            cm,
            failure: None,
        }
    }

    pub fn finish(self) -> Result<(), TransformError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn halted(&self) -> bool {
        self.failure.is_some()
    }

    fn settle<T>(&mut self, result: Result<T, TransformError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(filename = self.cx.filename, %err, "stopping css transform");
                self.failure.get_or_insert(err);
                None
            }
        }
    }

    fn splice(&mut self, source: &str) -> Option<Box<Expr>> {
        let parsed = parse_expr(source).map_err(TransformError::Splice);
        self.settle(parsed)
    }

    fn rewrite_default_import(&mut self, import: &ImportDecl) -> Option<VarDecl> {
        if import.type_only {
            return None;
        }

        let local = import.specifiers.iter().find_map(|specifier| match specifier {
            ImportSpecifier::Default(default) => Some(default.local.clone()),
            _ => None,
        })?;

        let path = &*import.src.value;
        if !self.cx.config.is_managed_resource(path) {
            return None;
        }

        if import.specifiers.len() > 1 {
            tracing::warn!(
                filename = self.cx.filename,
                path,
                "only the default import of a css module is kept"
            );
        }
        tracing::debug!(filename = self.cx.filename, path, local = %local.sym, "compiling css import");

        let source = self.settle(compile_module_reference(&self.cx, path))?;
        let init = self.splice(&source)?;

        Some(VarDecl {
            span: import.span,
            ctxt: SyntaxContext::empty(),
            kind: VarDeclKind::Const,
            declare: false,
            decls: vec![VarDeclarator {
                span: import.span,
                name: Pat::Ident(BindingIdent {
                    id: local,
                    type_ann: None,
                }),
                init: Some(init),
                definite: false,
            }],
        })
    }

    fn rewrite_require(&mut self, call: &CallExpr) -> Option<Box<Expr>> {
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        if !callee.as_ident().is_some_and(|ident| &*ident.sym == "require") {
            return None;
        }

        let first = call.args.first()?;
        if first.spread.is_some() {
            return None;
        }
        let Expr::Lit(Lit::Str(path)) = &*first.expr else {
            return None;
        };

        let path = &*path.value;
        if !self.cx.config.is_managed_resource(path) {
            return None;
        }
        tracing::debug!(filename = self.cx.filename, path, "compiling css require");

        let source = self.settle(compile_module_reference(&self.cx, path))?;
        self.splice(&source)
    }

    fn rewrite_tagged_template(&mut self, tagged: &mut TaggedTpl) -> Option<Box<Expr>> {
        let tag = tagged.tag.as_ident()?.sym.clone();

        let strings = tagged
            .tpl
            .quasis
            .iter()
            .map(|quasi| quasi.cooked.as_ref().unwrap_or(&quasi.raw).to_string())
            .collect();
        let start_line = if tagged.span.is_dummy() {
            0
        } else {
            self.cm.lookup_char_pos(tagged.span.lo).line
        };

        let literal = TemplateLiteral {
            strings,
            interpolations: &tagged.tpl.exprs,
            start_line,
        };
        let compiled = compile_template_literal(&self.cx, &tag, &literal);
        let compiled = self.settle(compiled)??;
        tracing::debug!(filename = self.cx.filename, line = start_line, "compiled css template");

        let mut expr = self.splice(&compiled.source)?;
        let holes = mem::take(&mut tagged.tpl.exprs);
        graft_holes(&mut expr, &compiled.hole_prefix, &holes);
        Some(expr)
    }
}

impl VisitMut for CssModulesTransform<'_> {
    noop_visit_mut_type!();

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        for item in items.iter_mut() {
            if self.halted() {
                return;
            }

            if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
                if let Some(decl) = self.rewrite_default_import(import) {
                    *item = ModuleItem::Stmt(Stmt::Decl(Decl::Var(Box::new(decl))));
                }
                continue;
            }

            item.visit_mut_with(self);
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.halted() {
            return;
        }

        // Children first so interpolations are already rewritten when a
        // template moves them into its replacement.
        expr.visit_mut_children_with(self);
        if self.halted() {
            return;
        }

        let replacement = match expr {
            Expr::Call(call) => self.rewrite_require(call),
            Expr::TaggedTpl(tagged) => self.rewrite_tagged_template(tagged),
            _ => None,
        };

        if let Some(replacement) = replacement {
            *expr = *replacement;
        }
    }
}
