//! Generic AST traversal.
//!
//! Passes implement [`Visitor`] and override the node kinds they care about;
//! everything else falls through to the `walk_*` functions which recurse
//! into every child. The `'ast` lifetime lets a pass keep references into
//! the tree (e.g. to a declaration's escape flag) while it runs.

use tiger_diagnostics::span::Spanned;

use crate::ast::*;

pub trait Visitor<'ast> {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program)
    }

    fn visit_expr(&mut self, expr: &'ast Spanned<Expr>) {
        walk_expr(self, expr)
    }

    fn visit_var(&mut self, var: &'ast Spanned<Var>) {
        walk_var(self, var)
    }

    fn visit_dec(&mut self, dec: &'ast Spanned<Dec>) {
        walk_dec(self, dec)
    }

    fn visit_fun_dec(&mut self, dec: &'ast Spanned<FunDec>) {
        walk_fun_dec(self, dec)
    }

    fn visit_ty(&mut self, _ty: &'ast Spanned<Ty>) {}
}

pub fn walk_program<'ast, T: Visitor<'ast> + ?Sized>(visitor: &mut T, program: &'ast Program) {
    visitor.visit_expr(&program.expr);
}

pub fn walk_expr<'ast, T: Visitor<'ast> + ?Sized>(visitor: &mut T, expr: &'ast Spanned<Expr>) {
    match &**expr {
        Expr::Var(var) => visitor.visit_var(var),
        Expr::Nil | Expr::Int(_) | Expr::Str(_) | Expr::Break => {}
        Expr::Call(Spanned(CallExpr { func: _, args }, _)) => {
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        Expr::Op(Spanned(OpExpr { lhs, op: _, rhs }, _)) => {
            visitor.visit_expr(lhs);
            visitor.visit_expr(rhs);
        }
        Expr::Neg(Spanned(NegExpr { expr }, _)) => visitor.visit_expr(expr),
        Expr::Record(Spanned(RecordExpr { ty: _, fields }, _)) => {
            for field in fields {
                visitor.visit_expr(&field.expr);
            }
        }
        Expr::Array(Spanned(ArrayExpr { ty: _, size, init }, _)) => {
            visitor.visit_expr(size);
            visitor.visit_expr(init);
        }
        Expr::Seq(Spanned(SeqExpr { exprs }, _)) => {
            for expr in exprs {
                visitor.visit_expr(expr);
            }
        }
        Expr::Assign(Spanned(AssignExpr { var, expr }, _)) => {
            visitor.visit_var(var);
            visitor.visit_expr(expr);
        }
        Expr::If(Spanned(IfExpr { cond, then, else_ }, _)) => {
            visitor.visit_expr(cond);
            visitor.visit_expr(then);
            if let Some(else_) = else_ {
                visitor.visit_expr(else_);
            }
        }
        Expr::While(Spanned(WhileExpr { cond, body }, _)) => {
            visitor.visit_expr(cond);
            visitor.visit_expr(body);
        }
        Expr::For(Spanned(
            ForExpr {
                var: _,
                escape: _,
                lo,
                hi,
                body,
            },
            _,
        )) => {
            visitor.visit_expr(lo);
            visitor.visit_expr(hi);
            visitor.visit_expr(body);
        }
        Expr::Let(Spanned(LetExpr { decs, body }, _)) => {
            for dec in decs {
                visitor.visit_dec(dec);
            }
            for expr in body {
                visitor.visit_expr(expr);
            }
        }
    }
}

pub fn walk_var<'ast, T: Visitor<'ast> + ?Sized>(visitor: &mut T, var: &'ast Spanned<Var>) {
    match &**var {
        Var::Simple(_) => {}
        Var::Field(Spanned(FieldVar { var, field: _ }, _)) => visitor.visit_var(var),
        Var::Subscript(Spanned(SubscriptVar { var, index }, _)) => {
            visitor.visit_var(var);
            visitor.visit_expr(index);
        }
    }
}

pub fn walk_dec<'ast, T: Visitor<'ast> + ?Sized>(visitor: &mut T, dec: &'ast Spanned<Dec>) {
    match &**dec {
        Dec::Var(Spanned(
            VarDec {
                ident: _,
                ty: _,
                init,
                escape: _,
            },
            _,
        )) => visitor.visit_expr(init),
        Dec::Fun(fun_decs) => {
            for fun_dec in fun_decs {
                visitor.visit_fun_dec(fun_dec);
            }
        }
        Dec::Type(type_decs) => {
            for type_dec in type_decs {
                visitor.visit_ty(&type_dec.ty);
            }
        }
    }
}

pub fn walk_fun_dec<'ast, T: Visitor<'ast> + ?Sized>(visitor: &mut T, dec: &'ast Spanned<FunDec>) {
    visitor.visit_expr(&dec.body);
}
