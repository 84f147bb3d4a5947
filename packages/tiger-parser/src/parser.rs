use std::cell::Cell;
use std::ops::Range;

use logos::Logos;
use thiserror::Error;
use tiger_diagnostics::ariadne::ReportKind;
use tiger_diagnostics::span::{spanned, FileId, Span, Spanned};
use tiger_diagnostics::{Diagnostics, Label, Report};

use crate::ast::*;
use crate::lexer::{BinOp, Token};

pub struct Parser {
    /// All the tokens.
    tokens: Vec<(Token, Range<usize>)>,
    /// An index into `tokens`, representing the current token.
    /// Initially 0, and incremented by `get_next` after each token is
    /// consumed.
    ///
    /// The first token is a dummy token, so when calling `get_next` for the
    /// first time, the first real token is returned.
    cursor: usize,
    /// The current file that is being parsed.
    file_id: FileId,
    diagnostics: Diagnostics,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("expected one of: {expected:?}, found {unexpected:?}.")]
    ExpectedToken {
        unexpected: Token,
        expected: Vec<Token>,
    },
    #[error("expected an expression, found {unexpected:?}.")]
    ExpectedExpr { unexpected: Token },
    #[error("expected a type, found {unexpected:?}.")]
    ExpectedType { unexpected: Token },
    #[error("`{lhs}` is not an lvalue and cannot be assigned to.")]
    InvalidAssignTarget { lhs: String },
}

pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// A temporary struct used to store the start of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpanStart {
    start: u32,
}

impl Parser {
    pub fn new(file_id: FileId, source: &str, diagnostics: Diagnostics) -> Self {
        let tokens = Some((Token::Start, 0..0))
            .into_iter()
            .chain(Token::lexer(source).spanned())
            .collect();
        Self {
            tokens,
            cursor: 0,
            file_id,
            diagnostics,
        }
    }

    pub fn eof(&self) -> bool {
        self.peek_next() == &Token::Eof
    }

    /// Returns a `SpanStart` that can be used to create a `Span` later.
    #[must_use]
    fn start(&self) -> SpanStart {
        let start = self
            .tokens
            .get(self.cursor + 1)
            .map(|x| x.1.start)
            .unwrap_or(0) as u32;
        SpanStart { start }
    }

    /// Returns a `Span` from a `SpanStart`.
    #[must_use]
    fn end(&self, start: SpanStart) -> Span {
        let end = self.tokens.get(self.cursor).map(|x| x.1.end).unwrap_or(0) as u32;
        Span {
            start: start.start,
            end,
            file_id: self.file_id,
        }
    }

    #[must_use]
    fn finish<T>(&self, start: SpanStart, node: T) -> Spanned<T> {
        spanned(self.end(start), node)
    }

    /// Get the current token.
    #[must_use]
    pub fn get_current(&self) -> &Token {
        self.tokens
            .get(self.cursor)
            .map(|x| &x.0)
            .unwrap_or(&Token::Eof)
    }

    /// Get the next token and increments the cursor.
    pub fn get_next(&mut self) -> &Token {
        self.cursor += 1;
        self.tokens
            .get(self.cursor)
            .map(|x| &x.0)
            .unwrap_or(&Token::Eof)
    }

    /// Get the next token without incrementing the cursor.
    #[must_use]
    pub fn peek_next(&self) -> &Token {
        self.tokens
            .get(self.cursor + 1)
            .map(|x| &x.0)
            .unwrap_or(&Token::Eof)
    }

    /// Get the token that is `n` tokens ahead without incrementing the
    /// cursor. If `n` is greater than the number of tokens left,
    /// [`Token::Eof`] is returned.
    pub fn peek_nth(&self, n: usize) -> &Token {
        self.tokens
            .get(self.cursor + n)
            .map(|x| &x.0)
            .unwrap_or(&Token::Eof)
    }

    /// Get the next token and expect it to be the same token as `expected`.
    pub fn expect(&mut self, expected: Token) -> Result<()> {
        let start = self.start();
        if self.get_next() == &expected {
            Ok(())
        } else {
            let span = self.end(start);
            let unexpected = self.get_current().clone();
            self.diagnostics.add(
                Report::build(ReportKind::Error, span.file_id, span.start as usize)
                    .with_message(format!("expected {expected:?}, found {unexpected:?}"))
                    .with_label(Label::new(span).with_message("unexpected token")),
            );
            Err(ParseError::ExpectedToken {
                unexpected,
                expected: vec![expected],
            })
        }
    }

    /// Create a [`ParseError::ExpectedToken`] error with the next token as
    /// the unexpected token.
    pub fn unexpected(&self, expected: Vec<Token>) -> ParseError {
        ParseError::ExpectedToken {
            unexpected: self.peek_next().clone(),
            expected,
        }
    }

    /// Parse a whole program: a single expression followed by end of input.
    pub fn parse_program(&mut self) -> Result<Program> {
        let expr = self.parse_expr()?;
        if !self.eof() {
            return Err(self.unexpected(vec![Token::Eof]));
        }
        Ok(Program { expr })
    }

    pub fn parse_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.start();
        let lhs = self.parse_expr_with_min_bp(0)?;

        // Assignment is not part of the operator precedence ladder: it takes
        // an lvalue on the left and binds loosest.
        if self.peek_next() == &Token::Assign {
            let var = match lhs {
                Spanned(Expr::Var(var), _) => var,
                lhs => {
                    return Err(ParseError::InvalidAssignTarget {
                        lhs: format!("{:?}", lhs.unspan()),
                    })
                }
            };
            self.expect(Token::Assign)?;
            let expr = self.parse_expr()?;
            return Ok(self.finish(
                start,
                Expr::Assign(self.finish(
                    start,
                    AssignExpr {
                        var,
                        expr: Box::new(expr),
                    },
                )),
            ));
        }

        Ok(lhs)
    }

    pub fn parse_expr_with_min_bp(&mut self, min_bp: u32) -> Result<Spanned<Expr>> {
        let start = self.start();
        let mut lhs = self.parse_primary_expr()?;

        loop {
            let op_start = self.start();
            let op: BinOp = match self.peek_next().clone().try_into() {
                Ok(op) => op,
                Err(()) => break,
            };
            let (l_bp, r_bp) = op.binding_power();
            if l_bp < min_bp {
                break;
            }

            let _ = self.get_next();
            let op = self.finish(op_start, op);

            let rhs = self.parse_expr_with_min_bp(r_bp)?;
            lhs = self.finish(
                start,
                Expr::Op(self.finish(
                    start,
                    OpExpr {
                        lhs: Box::new(lhs),
                        op,
                        rhs: Box::new(rhs),
                    },
                )),
            );
        }

        Ok(lhs)
    }

    pub fn parse_primary_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.start();
        match self.peek_next() {
            Token::KwNil => {
                let _ = self.get_next();
                Ok(self.finish(start, Expr::Nil))
            }
            Token::LitInt(int) => {
                let int = *int;
                let _ = self.get_next();
                Ok(self.finish(start, Expr::Int(int)))
            }
            Token::LitStr(str) => {
                let str = str.clone();
                let _ = self.get_next();
                Ok(self.finish(start, Expr::Str(str)))
            }
            Token::KwBreak => {
                let _ = self.get_next();
                Ok(self.finish(start, Expr::Break))
            }
            Token::Minus => {
                self.expect(Token::Minus)?;
                // Unary minus binds tighter than any binary operator.
                let expr = self.parse_expr_with_min_bp(1040)?;
                Ok(self.finish(
                    start,
                    Expr::Neg(self.finish(
                        start,
                        NegExpr {
                            expr: Box::new(expr),
                        },
                    )),
                ))
            }
            Token::LParen => self.parse_seq_expr(),
            Token::KwIf => {
                let expr = self.parse_if_expr()?;
                Ok(self.finish(start, Expr::If(expr)))
            }
            Token::KwWhile => {
                let expr = self.parse_while_expr()?;
                Ok(self.finish(start, Expr::While(expr)))
            }
            Token::KwFor => {
                let expr = self.parse_for_expr()?;
                Ok(self.finish(start, Expr::For(expr)))
            }
            Token::KwLet => {
                let expr = self.parse_let_expr()?;
                Ok(self.finish(start, Expr::Let(expr)))
            }
            Token::Ident(_) => self.parse_ident_expr(),
            _ => Err(ParseError::ExpectedExpr {
                unexpected: self.peek_next().clone(),
            }),
        }
    }

    /// Parse an expression starting with an identifier: a call, a record or
    /// array creation, or an lvalue.
    fn parse_ident_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.start();
        let ident = self.parse_ident()?;
        match self.peek_next() {
            Token::LParen => {
                self.expect(Token::LParen)?;
                let mut args = Vec::new();
                while self.peek_next() != &Token::RParen {
                    args.push(self.parse_expr()?);
                    if self.peek_next() != &Token::Comma {
                        break;
                    }
                    self.expect(Token::Comma)?;
                }
                self.expect(Token::RParen)?;
                Ok(self.finish(
                    start,
                    Expr::Call(self.finish(start, CallExpr { func: ident, args })),
                ))
            }
            Token::LBrace => {
                self.expect(Token::LBrace)?;
                let mut fields = Vec::new();
                while let Token::Ident(_) = self.peek_next() {
                    fields.push(self.parse_field_init()?);
                    if self.peek_next() != &Token::Comma {
                        break;
                    }
                    self.expect(Token::Comma)?;
                }
                self.expect(Token::RBrace)?;
                Ok(self.finish(
                    start,
                    Expr::Record(self.finish(start, RecordExpr { ty: ident, fields })),
                ))
            }
            Token::LBracket => {
                // Either an array creation `ty[size] of init` or a subscript
                // lvalue `var[index]`. Only `of` after the bracket decides.
                self.expect(Token::LBracket)?;
                let index = self.parse_expr()?;
                self.expect(Token::RBracket)?;
                if self.peek_next() == &Token::KwOf {
                    self.expect(Token::KwOf)?;
                    let init = self.parse_expr()?;
                    Ok(self.finish(
                        start,
                        Expr::Array(self.finish(
                            start,
                            ArrayExpr {
                                ty: ident,
                                size: Box::new(index),
                                init: Box::new(init),
                            },
                        )),
                    ))
                } else {
                    let simple_span = ident.span();
                    let var = self.finish(
                        start,
                        Var::Subscript(self.finish(
                            start,
                            SubscriptVar {
                                var: Box::new(spanned(
                                    simple_span,
                                    Var::Simple(spanned(simple_span, ident.unspan())),
                                )),
                                index: Box::new(index),
                            },
                        )),
                    );
                    let var = self.parse_var_suffix(start, var)?;
                    Ok(self.finish(start, Expr::Var(var)))
                }
            }
            _ => {
                let simple_span = ident.span();
                let var = spanned(simple_span, Var::Simple(spanned(simple_span, ident.unspan())));
                let var = self.parse_var_suffix(start, var)?;
                Ok(self.finish(start, Expr::Var(var)))
            }
        }
    }

    /// Parse the `.field` and `[index]` suffixes of an lvalue.
    fn parse_var_suffix(
        &mut self,
        start: SpanStart,
        mut var: Spanned<Var>,
    ) -> Result<Spanned<Var>> {
        loop {
            match self.peek_next() {
                Token::Dot => {
                    self.expect(Token::Dot)?;
                    let field = self.parse_ident()?;
                    var = self.finish(
                        start,
                        Var::Field(self.finish(
                            start,
                            FieldVar {
                                var: Box::new(var),
                                field,
                            },
                        )),
                    );
                }
                Token::LBracket => {
                    self.expect(Token::LBracket)?;
                    let index = self.parse_expr()?;
                    self.expect(Token::RBracket)?;
                    var = self.finish(
                        start,
                        Var::Subscript(self.finish(
                            start,
                            SubscriptVar {
                                var: Box::new(var),
                                index: Box::new(index),
                            },
                        )),
                    );
                }
                _ => break,
            }
        }
        Ok(var)
    }

    fn parse_field_init(&mut self) -> Result<Spanned<FieldInit>> {
        let start = self.start();
        let ident = self.parse_ident()?;
        self.expect(Token::Eq)?;
        let expr = self.parse_expr()?;
        Ok(self.finish(start, FieldInit { ident, expr }))
    }

    /// Parse `( e1; e2; ... )`. A single parenthesized expression is not a
    /// sequence.
    fn parse_seq_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.start();
        self.expect(Token::LParen)?;
        let mut exprs = Vec::new();
        while self.peek_next() != &Token::RParen {
            exprs.push(self.parse_expr()?);
            if self.peek_next() != &Token::Semi {
                break;
            }
            self.expect(Token::Semi)?;
        }
        self.expect(Token::RParen)?;
        match exprs.len() {
            1 => Ok(exprs.into_iter().next().unwrap()),
            _ => Ok(self.finish(start, Expr::Seq(self.finish(start, SeqExpr { exprs })))),
        }
    }

    pub fn parse_if_expr(&mut self) -> Result<Spanned<IfExpr>> {
        let start = self.start();
        self.expect(Token::KwIf)?;
        let cond = self.parse_expr()?;
        self.expect(Token::KwThen)?;
        let then = self.parse_expr()?;
        let else_ = if self.peek_next() == &Token::KwElse {
            self.expect(Token::KwElse)?;
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(self.finish(
            start,
            IfExpr {
                cond: Box::new(cond),
                then: Box::new(then),
                else_,
            },
        ))
    }

    pub fn parse_while_expr(&mut self) -> Result<Spanned<WhileExpr>> {
        let start = self.start();
        self.expect(Token::KwWhile)?;
        let cond = self.parse_expr()?;
        self.expect(Token::KwDo)?;
        let body = self.parse_expr()?;
        Ok(self.finish(
            start,
            WhileExpr {
                cond: Box::new(cond),
                body: Box::new(body),
            },
        ))
    }

    pub fn parse_for_expr(&mut self) -> Result<Spanned<ForExpr>> {
        let start = self.start();
        self.expect(Token::KwFor)?;
        let var = self.parse_ident()?;
        self.expect(Token::Assign)?;
        let lo = self.parse_expr()?;
        self.expect(Token::KwTo)?;
        let hi = self.parse_expr()?;
        self.expect(Token::KwDo)?;
        let body = self.parse_expr()?;
        Ok(self.finish(
            start,
            ForExpr {
                var,
                escape: Cell::new(false),
                lo: Box::new(lo),
                hi: Box::new(hi),
                body: Box::new(body),
            },
        ))
    }

    pub fn parse_let_expr(&mut self) -> Result<Spanned<LetExpr>> {
        let start = self.start();
        self.expect(Token::KwLet)?;
        let decs = self.parse_decs()?;
        self.expect(Token::KwIn)?;
        let mut body = Vec::new();
        while self.peek_next() != &Token::KwEnd {
            body.push(self.parse_expr()?);
            if self.peek_next() != &Token::Semi {
                break;
            }
            self.expect(Token::Semi)?;
        }
        self.expect(Token::KwEnd)?;
        Ok(self.finish(start, LetExpr { decs, body }))
    }

    pub fn parse_decs(&mut self) -> Result<Vec<Spanned<Dec>>> {
        let mut decs = Vec::new();
        loop {
            let start = self.start();
            match self.peek_next() {
                Token::KwVar => {
                    let dec = self.parse_var_dec()?;
                    decs.push(self.finish(start, Dec::Var(dec)));
                }
                Token::KwFunction => {
                    // Adjacent function declarations are one mutually
                    // recursive group.
                    let mut fun_decs = Vec::new();
                    while self.peek_next() == &Token::KwFunction {
                        fun_decs.push(self.parse_fun_dec()?);
                    }
                    decs.push(self.finish(start, Dec::Fun(fun_decs)));
                }
                Token::KwType => {
                    let mut type_decs = Vec::new();
                    while self.peek_next() == &Token::KwType {
                        type_decs.push(self.parse_type_dec()?);
                    }
                    decs.push(self.finish(start, Dec::Type(type_decs)));
                }
                _ => break,
            }
        }
        Ok(decs)
    }

    pub fn parse_var_dec(&mut self) -> Result<Spanned<VarDec>> {
        let start = self.start();
        self.expect(Token::KwVar)?;
        let ident = self.parse_ident()?;
        let ty = if self.peek_next() == &Token::Colon {
            self.expect(Token::Colon)?;
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.expect(Token::Assign)?;
        let init = self.parse_expr()?;
        Ok(self.finish(
            start,
            VarDec {
                ident,
                ty,
                init: Box::new(init),
                escape: Cell::new(false),
            },
        ))
    }

    pub fn parse_fun_dec(&mut self) -> Result<Spanned<FunDec>> {
        let start = self.start();
        self.expect(Token::KwFunction)?;
        let ident = self.parse_ident()?;
        self.expect(Token::LParen)?;
        let params = self.parse_field_decs()?;
        self.expect(Token::RParen)?;
        let result = if self.peek_next() == &Token::Colon {
            self.expect(Token::Colon)?;
            Some(self.parse_ident()?)
        } else {
            None
        };
        self.expect(Token::Eq)?;
        let body = self.parse_expr()?;
        Ok(self.finish(
            start,
            FunDec {
                ident,
                params,
                result,
                body: Box::new(body),
            },
        ))
    }

    pub fn parse_type_dec(&mut self) -> Result<Spanned<TypeDec>> {
        let start = self.start();
        self.expect(Token::KwType)?;
        let ident = self.parse_ident()?;
        self.expect(Token::Eq)?;
        let ty = self.parse_ty()?;
        Ok(self.finish(start, TypeDec { ident, ty }))
    }

    pub fn parse_ty(&mut self) -> Result<Spanned<Ty>> {
        let start = self.start();
        match self.peek_next() {
            Token::LBrace => {
                self.expect(Token::LBrace)?;
                let fields = self.parse_field_decs()?;
                self.expect(Token::RBrace)?;
                Ok(self.finish(start, Ty::Record(fields)))
            }
            Token::KwArray => {
                self.expect(Token::KwArray)?;
                self.expect(Token::KwOf)?;
                let ident = self.parse_ident()?;
                Ok(self.finish(start, Ty::Array(ident)))
            }
            Token::Ident(_) => {
                let ident = self.parse_ident()?;
                Ok(self.finish(start, Ty::Name(ident)))
            }
            _ => Err(ParseError::ExpectedType {
                unexpected: self.peek_next().clone(),
            }),
        }
    }

    /// Parse a comma separated list of `name: type` fields, as used for
    /// function formals and record types.
    pub fn parse_field_decs(&mut self) -> Result<Vec<Spanned<FieldDec>>> {
        let mut fields = Vec::new();
        while let Token::Ident(_) = self.peek_next() {
            let start = self.start();
            let ident = self.parse_ident()?;
            self.expect(Token::Colon)?;
            let ty = self.parse_ident()?;
            fields.push(self.finish(
                start,
                FieldDec {
                    ident,
                    ty,
                    escape: Cell::new(false),
                },
            ));
            if self.peek_next() != &Token::Comma {
                break;
            }
            self.expect(Token::Comma)?;
        }
        Ok(fields)
    }

    pub fn parse_ident(&mut self) -> Result<Spanned<Ident>> {
        let start = self.start();
        let next = self.get_next();
        let Token::Ident(ident) = next else {
            return Err(ParseError::ExpectedToken {
                unexpected: next.clone(),
                expected: vec![Token::Ident("".to_string())],
            });
        };
        let ident = Ident::new(ident);
        Ok(self.finish(start, ident))
    }
}
