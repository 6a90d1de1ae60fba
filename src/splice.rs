//! Turns generated source text back into AST nodes.

use anyhow::{Context, Error, anyhow, bail};
use swc_core::common::{DUMMY_SP, FileName, SourceMap, sync::Lrc};
use swc_core::ecma::ast::{
    BinExpr, BinaryOp, ComputedPropName, EsVersion, Expr, ExprStmt, KeyValueProp, Lit, MemberProp,
    ParenExpr, Prop, PropName, Stmt, Str,
};
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, lexer::Lexer};
use swc_core::ecma::visit::{VisitMut, VisitMutWith, noop_visit_mut_type};

use crate::template::{Segment, hole_index, split_holes};

/// Parses `input_str` as a single expression.
///
/// The whole text must be consumed; trailing statements or tokens are an
/// error. The result keeps its parentheses unless it is a primary expression.
/// The printer does not add any, and the node may land in statement or callee
/// position.
pub(crate) fn parse_expr(input_str: &str) -> Result<Box<Expr>, Error> {
    // Newlines keep a trailing line comment from swallowing the closing paren.
    let wrapped = format!("(\n{input_str}\n)");

    let cm = Lrc::new(SourceMap::default());
    let fm = cm.new_source_file(FileName::Anon.into(), wrapped);

    let lexer = Lexer::new(
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        StringInput::from(&*fm),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let script = parser
        .parse_script()
        .map_err(|err| anyhow!("{err:?}"))
        .with_context(|| format!("failed to parse `{input_str}` as an expression"))?;

    if let Some(err) = parser.take_errors().into_iter().next() {
        bail!("failed to parse `{input_str}` as an expression: {err:?}");
    }

    let mut body = script.body;
    let expr = match (body.pop(), body.is_empty()) {
        (Some(Stmt::Expr(ExprStmt { expr, .. })), true) => expr,
        _ => bail!("expected a single expression in `{input_str}`, found trailing code"),
    };

    match *expr {
        Expr::Paren(paren) if is_primary(&paren.expr) => Ok(paren.expr),
        Expr::Paren(paren) => Ok(Box::new(Expr::Paren(paren))),
        other => bail!("expected a single expression in `{input_str}`, got: {other:?}"),
    }
}

fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_)
            | Expr::Lit(_)
            | Expr::This(_)
            | Expr::Member(_)
            | Expr::Call(_)
            | Expr::Paren(_)
            | Expr::Array(_)
            | Expr::Tpl(_)
            | Expr::TaggedTpl(_)
    )
}

/// Replaces every placeholder `<prefix><i>` in `expr` with `holes[i]`.
///
/// Placeholders are recognized as identifiers (including shorthand
/// properties, property keys and member names) and inside string literals,
/// which become concatenations.
pub(crate) fn graft_holes(expr: &mut Expr, prefix: &str, holes: &[Box<Expr>]) {
    if holes.is_empty() || prefix.is_empty() {
        return;
    }
    expr.visit_mut_with(&mut HoleFiller { prefix, holes });
}

struct HoleFiller<'a> {
    prefix: &'a str,
    holes: &'a [Box<Expr>],
}

impl HoleFiller<'_> {
    fn hole(&self, name: &str) -> Option<Expr> {
        hole_index(name, self.prefix)
            .and_then(|id| self.holes.get(id))
            .map(|hole| wrap(hole))
    }

    /// Builds `"text" + hole + ...` for a string literal containing
    /// placeholders. The first operand is always a string so the result stays
    /// a string.
    fn concat(&self, value: &str) -> Option<Expr> {
        let segments = split_holes(value, self.prefix, self.holes.len());
        if !segments.iter().any(|segment| matches!(segment, Segment::Hole(_))) {
            return None;
        }

        let mut acc = match segments.first() {
            Some(Segment::Text(_)) => None,
            _ => Some(str_lit("")),
        };
        for segment in segments {
            let part = match segment {
                Segment::Text(text) => str_lit(text),
                Segment::Hole(id) => wrap(&self.holes[id]),
            };
            acc = Some(match acc {
                None => part,
                Some(left) => Expr::Bin(BinExpr {
                    span: DUMMY_SP,
                    op: BinaryOp::Add,
                    left: Box::new(left),
                    right: Box::new(part),
                }),
            });
        }
        acc
    }
}

impl VisitMut for HoleFiller<'_> {
    noop_visit_mut_type!();

    // Interpolations were transformed before the template; none of the
    // replacements below descend into them again.

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(ident) => {
                if let Some(hole) = self.hole(&ident.sym) {
                    *expr = hole;
                }
            }
            Expr::Lit(Lit::Str(s)) => {
                if let Some(concat) = self.concat(&s.value) {
                    *expr = paren(concat);
                }
            }
            _ => expr.visit_mut_children_with(self),
        }
    }

    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        if let Prop::Shorthand(ident) = prop
            && let Some(hole) = self.hole(&ident.sym)
        {
            *prop = Prop::KeyValue(KeyValueProp {
                key: computed(hole.clone()),
                value: Box::new(hole),
            });
            return;
        }
        prop.visit_mut_children_with(self);
    }

    fn visit_mut_prop_name(&mut self, name: &mut PropName) {
        let replacement = match name {
            PropName::Ident(ident) => self.hole(&ident.sym),
            PropName::Str(s) => self.concat(&s.value),
            _ => None,
        };
        match replacement {
            Some(key) => *name = computed(key),
            None => name.visit_mut_children_with(self),
        }
    }

    fn visit_mut_member_prop(&mut self, member: &mut MemberProp) {
        if let MemberProp::Ident(ident) = member
            && let Some(hole) = self.hole(&ident.sym)
        {
            *member = MemberProp::Computed(ComputedPropName {
                span: DUMMY_SP,
                expr: Box::new(hole),
            });
            return;
        }
        member.visit_mut_children_with(self);
    }
}

fn wrap(hole: &Expr) -> Expr {
    if is_primary(hole) {
        hole.clone()
    } else {
        paren(hole.clone())
    }
}

fn paren(expr: Expr) -> Expr {
    Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr: Box::new(expr),
    })
}

fn computed(expr: Expr) -> PropName {
    PropName::Computed(ComputedPropName {
        span: DUMMY_SP,
        expr: Box::new(expr),
    })
}

fn str_lit(value: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}
