//! Textual report of the escape flags.

use std::fmt::Write;

use tiger_diagnostics::span::Spanned;
use tiger_parser::ast::{Dec, Expr, ForExpr, FunDec, Program, Ty};
use tiger_parser::visitor::{walk_dec, walk_expr, walk_fun_dec, Visitor};

/// Lists every declaration site with its escape flag, in traversal order.
///
/// Used by `tigerc` and the pass tests. Run this after
/// [`resolve_escapes`](crate::escape::resolve_escapes); on a fresh tree it
/// reports every flag as false.
pub fn dump_escapes(program: &Program) -> String {
    let mut dump = DumpEscapes { out: String::new() };
    dump.visit_program(program);
    dump.out
}

struct DumpEscapes {
    out: String,
}

impl DumpEscapes {
    fn line(&mut self, kind: &str, ident: &impl std::fmt::Display, escape: bool) {
        writeln!(self.out, "{kind} {ident}: {escape}").unwrap();
    }
}

impl<'ast> Visitor<'ast> for DumpEscapes {
    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        if let Expr::For(Spanned(ForExpr { var, escape, .. }, _)) = &**expr {
            self.line("for", var.as_ref(), escape.get());
        }
        walk_expr(self, expr);
    }

    fn visit_dec(&mut self, dec: &'ast Spanned<Dec>) {
        if let Dec::Var(var_dec) = &**dec {
            self.line("var", var_dec.ident.as_ref(), var_dec.escape.get());
        }
        walk_dec(self, dec);
    }

    fn visit_fun_dec(&mut self, dec: &'ast Spanned<FunDec>) {
        for param in &dec.params {
            self.line("param", param.ident.as_ref(), param.escape.get());
        }
        walk_fun_dec(self, dec);
    }

    fn visit_ty(&mut self, ty: &'ast Spanned<Ty>) {
        if let Ty::Record(fields) = &**ty {
            for field in fields {
                self.line("field", field.ident.as_ref(), field.escape.get());
            }
        }
    }
}
