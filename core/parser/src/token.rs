//! FILENAME: core/parser/src/token.rs
//! PURPOSE: Token definitions for the formula lexer.
//! CONTEXT: Tokens are the atomic units produced by the lexer and consumed by the parser.
//! Each token remembers its source text and the character offset it started at,
//! so parse errors can point back into the formula.

use serde::Serialize;

/// Operators recognized by the lexer. Whether '-' is unary or binary is
/// decided by the parser, not here.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Operator {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Caret,
    EqualEqual,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterEqual,
    LessEqual,
    AndAnd,
    OrOr,
    Bang,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Asterisk => "*",
            Operator::Slash => "/",
            Operator::Percent => "%",
            Operator::Caret => "^",
            Operator::EqualEqual => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::AndAnd => "&&",
            Operator::OrOr => "||",
            Operator::Bang => "!",
        }
    }
}

/// The kind of a token, carrying any decoded payload.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    /// A bare name. `call_head` is set when the next non-whitespace
    /// character is '(' so the parser can tell `foo` from `foo(`.
    Identifier { call_head: bool },

    Operator(Operator),

    // Delimiters
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    EOF,
}

/// A single lexed token.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text exactly as written (string tokens include their quotes).
    pub text: String,
    /// 0-based character offset of the first character.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EOF
    }

    /// Returns the operator if this token is one.
    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    /// True for tokens that can begin an operand.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number(_)
                | TokenKind::String(_)
                | TokenKind::Boolean(_)
                | TokenKind::Null
                | TokenKind::Identifier { .. }
                | TokenKind::LParen
                | TokenKind::LBracket
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of expression"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
