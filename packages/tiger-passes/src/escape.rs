//! Escape analysis.
//!
//! A variable or formal escapes when a function nested more deeply than the
//! one that declared it reads or writes it. Frame layout needs to know this
//! before it places anything: an escaping binding must live somewhere that
//! outlives the declaring activation, while a non-escaping one can sit in a
//! register or local stack slot.
//!
//! The pass re-derives lexical scoping on its own (it needs the declaration
//! depth, which name resolution does not retain) and writes a single
//! boolean onto each declaration site. It raises no diagnostics: a name
//! that does not resolve here was already reported by the binder, so the
//! lookup is simply a no-op.

use std::cell::Cell;

use tiger_diagnostics::span::Spanned;
use tiger_parser::ast::{Dec, Expr, ForExpr, FunDec, Ident, LetExpr, Program, Var, VarDec};
use tiger_parser::visitor::{walk_dec, walk_expr, walk_var, Visitor};

use crate::scope::ScopedEnv;

/// Where a binding was introduced: the flag to flip and the function
/// nesting depth at its definition site.
#[derive(Debug)]
struct Definition<'ast> {
    escape: &'ast Cell<bool>,
    depth: u32,
}

/// AST pass that sets the `escape` flag on every declaration site.
#[derive(Debug)]
pub struct ResolveEscapes<'ast> {
    env: ScopedEnv<Definition<'ast>>,
}

impl<'ast> ResolveEscapes<'ast> {
    /// Create the pass with its root scope open.
    pub fn new() -> Self {
        Self {
            env: ScopedEnv::new(),
        }
    }

    /// Register a declaration at the current depth. The flag starts out
    /// false; only a deeper reference can set it.
    fn declare(&mut self, ident: &Ident, escape: &'ast Cell<bool>) {
        escape.set(false);
        let depth = self.env.depth();
        self.env.put(ident.clone(), Definition { escape, depth });
    }

    /// Record a use of `ident`. A use from a function nested below the
    /// definition site marks the definition as escaping. Marking is
    /// monotonic: the flag is never cleared by a later use.
    fn reference(&mut self, ident: &Ident) {
        if let Some(def) = self.env.get(ident) {
            if self.env.depth() > def.depth {
                def.escape.set(true);
            }
        }
    }

    /// Run `f` inside a block scope. Depth is unchanged.
    fn with_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.env.scope_begin();
        f(self);
        self.env.scope_end();
    }

    /// Run `f` inside a function body scope, one level deeper.
    fn with_function_scope(&mut self, f: impl FnOnce(&mut Self)) {
        self.env.scope_begin();
        self.env.enter_function();
        f(self);
        self.env.exit_function();
        self.env.scope_end();
    }

    /// Tear the pass down, checking scope and depth balance.
    fn finish(self) {
        self.env.finish();
    }
}

impl<'ast> Default for ResolveEscapes<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Visitor<'ast> for ResolveEscapes<'ast> {
    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        match &**expr {
            // A let opens a block scope around its declarations and body.
            Expr::Let(Spanned(LetExpr { decs, body }, _)) => self.with_scope(|this| {
                for dec in decs {
                    this.visit_dec(dec);
                }
                for expr in body {
                    this.visit_expr(expr);
                }
            }),
            // The loop variable is a declaration scoped to the body; the
            // bounds are evaluated outside it.
            Expr::For(Spanned(
                ForExpr {
                    var,
                    escape,
                    lo,
                    hi,
                    body,
                },
                _,
            )) => {
                self.visit_expr(lo);
                self.visit_expr(hi);
                self.with_scope(|this| {
                    this.declare(var, escape);
                    this.visit_expr(body);
                });
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_var(&mut self, var: &'ast Spanned<Var>) {
        match &**var {
            Var::Simple(ident) => self.reference(ident),
            _ => walk_var(self, var),
        }
    }

    fn visit_dec(&mut self, dec: &'ast Spanned<Dec>) {
        match &**dec {
            Dec::Var(Spanned(
                VarDec {
                    ident,
                    ty: _,
                    init,
                    escape,
                },
                _,
            )) => {
                // The initializer is evaluated in the enclosing scope: a
                // nested function in it that mentions the same name refers
                // to the outer binding, not this one.
                self.visit_expr(init);
                self.declare(ident, escape);
            }
            _ => walk_dec(self, dec),
        }
    }

    fn visit_fun_dec(&mut self, dec: &'ast Spanned<FunDec>) {
        self.with_function_scope(|this| {
            for param in &dec.params {
                this.declare(&param.ident, &param.escape);
            }
            this.visit_expr(&dec.body);
        });
    }
}

/// Compute the escapes for a whole program.
///
/// The tree itself is the output: every `escape` flag on a declaration site
/// holds its final value when this returns.
pub fn resolve_escapes(program: &Program) {
    let mut pass = ResolveEscapes::new();
    pass.visit_program(program);
    pass.finish();
}
