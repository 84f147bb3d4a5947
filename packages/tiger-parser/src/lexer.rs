#[derive(Debug, Clone, PartialEq, Eq, logos::Logos)]
pub enum Token {
    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("=")]
    Eq,
    #[token("<>")]
    Neq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,

    #[token(":=")]
    Assign,

    // Keywords
    #[token("array")]
    KwArray,
    #[token("break")]
    KwBreak,
    #[token("do")]
    KwDo,
    #[token("else")]
    KwElse,
    #[token("end")]
    KwEnd,
    #[token("for")]
    KwFor,
    #[token("function")]
    KwFunction,
    #[token("if")]
    KwIf,
    #[token("in")]
    KwIn,
    #[token("let")]
    KwLet,
    #[token("nil")]
    KwNil,
    #[token("of")]
    KwOf,
    #[token("then")]
    KwThen,
    #[token("to")]
    KwTo,
    #[token("type")]
    KwType,
    #[token("var")]
    KwVar,
    #[token("while")]
    KwWhile,

    // Identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Literals
    #[regex("[0-9]+", |lex| lex.slice().parse())]
    LitInt(i64),
    #[regex(r#""(?:[^"\\]|\\.)*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    LitStr(String),

    /// A special token that marks the start of the input.
    Start,
    /// A special token that represents the end of the input.
    Eof,
    #[error]
    #[regex(r"[ \t\r\n\f]+", logos::skip)] // Whitespace
    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", logos::skip)] // Comments (not nested)
    Err,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    // Relational
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    // Logical
    And,
    Or,
}

impl TryFrom<Token> for BinOp {
    type Error = ();

    fn try_from(value: Token) -> Result<Self, Self::Error> {
        match value {
            Token::Plus => Ok(BinOp::Plus),
            Token::Minus => Ok(BinOp::Minus),
            Token::Star => Ok(BinOp::Mul),
            Token::Slash => Ok(BinOp::Div),
            Token::Eq => Ok(BinOp::Eq),
            Token::Neq => Ok(BinOp::Neq),
            Token::Lt => Ok(BinOp::Lt),
            Token::Gt => Ok(BinOp::Gt),
            Token::LtEq => Ok(BinOp::LtEq),
            Token::GtEq => Ok(BinOp::GtEq),
            Token::Amp => Ok(BinOp::And),
            Token::Pipe => Ok(BinOp::Or),
            _ => Err(()),
        }
    }
}

impl BinOp {
    pub fn binding_power(self) -> (u32, u32) {
        match self {
            BinOp::Or => (100, 110),
            BinOp::And => (120, 130),
            // Comparisons are non-associative in Tiger. The parser does not
            // enforce that; the type checker would.
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::LtEq | BinOp::GtEq => {
                (300, 310)
            }
            BinOp::Plus | BinOp::Minus => (1000, 1010),
            BinOp::Mul | BinOp::Div => (1020, 1030),
        }
    }
}
