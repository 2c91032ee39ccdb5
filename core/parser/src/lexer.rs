//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number parsing, string literals, keywords and
//! multi-character operators like <= and &&.
//!
//! SUPPORTED OPERATORS:
//! - Single char: + - * / % ^ > < ! ( ) [ ] ,
//! - Multi char: == != >= <= && ||
//! - Word forms: and, or, not
//!
//! Scanning is strict: an unterminated string or
//! a stray character is an error carrying its position, not a token.

use crate::error::LexError;
use crate::token::{Operator, Token, TokenKind};

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Advances the lexer and returns the next token.
    /// Returns an EOF token once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start = self.pos;
        let ch = match self.bump() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::EOF, "", start)),
        };

        let token = match ch {
            '+' => self.operator(Operator::Plus, start),
            '-' => self.operator(Operator::Minus, start),
            '*' => self.operator(Operator::Asterisk, start),
            '/' => self.operator(Operator::Slash, start),
            '%' => self.operator(Operator::Percent, start),
            '^' => self.operator(Operator::Caret, start),
            '(' => Token::new(TokenKind::LParen, "(", start),
            ')' => Token::new(TokenKind::RParen, ")", start),
            '[' => Token::new(TokenKind::LBracket, "[", start),
            ']' => Token::new(TokenKind::RBracket, "]", start),
            ',' => Token::new(TokenKind::Comma, ",", start),

            '=' => self.read_pair('=', Operator::EqualEqual, start)?,
            '&' => self.read_pair('&', Operator::AndAnd, start)?,
            '|' => self.read_pair('|', Operator::OrOr, start)?,

            // Handle ! and potentially !=
            '!' => self.read_with_equals(Operator::Bang, Operator::NotEqual, start),

            // Handle < and potentially <=
            '<' => self.read_with_equals(Operator::LessThan, Operator::LessEqual, start),

            // Handle > and potentially >=
            '>' => self.read_with_equals(Operator::GreaterThan, Operator::GreaterEqual, start),

            '"' | '\'' => self.read_string(ch, start)?,

            ch if ch.is_ascii_digit() => self.read_number(start)?,

            ch if is_identifier_start(ch) => self.read_identifier(start),

            ch => {
                return Err(LexError::UnexpectedCharacter {
                    ch,
                    position: start,
                });
            }
        };

        Ok(token)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn operator(&self, op: Operator, start: usize) -> Token {
        Token::new(TokenKind::Operator(op), op.symbol(), start)
    }

    /// Handles operators that are only valid doubled: ==, &&, ||
    fn read_pair(&mut self, second: char, op: Operator, start: usize) -> Result<Token, LexError> {
        if self.peek() == Some(second) {
            self.pos += 1;
            Ok(self.operator(op, start))
        } else {
            Err(LexError::UnexpectedCharacter {
                ch: second,
                position: start,
            })
        }
    }

    /// Handles operators with an optional trailing '=': ! !=, < <=, > >=
    fn read_with_equals(&mut self, single: Operator, with_equals: Operator, start: usize) -> Token {
        if self.peek() == Some('=') {
            self.pos += 1;
            self.operator(with_equals, start)
        } else {
            self.operator(single, start)
        }
    }

    /// Reads a string delimited by `quote`. There are no escape sequences:
    /// the first matching quote ends the literal.
    fn read_string(&mut self, quote: char, start: usize) -> Result<Token, LexError> {
        let mut result = String::new();
        while let Some(ch) = self.bump() {
            if ch == quote {
                return Ok(Token::new(TokenKind::String(result), self.slice(start), start));
            }
            result.push(ch);
        }
        Err(LexError::UnterminatedString { position: start })
    }

    fn read_digits(&mut self) -> usize {
        let mut count = 0;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.pos += 1;
            count += 1;
        }
        count
    }

    fn read_number(&mut self, start: usize) -> Result<Token, LexError> {
        self.read_digits();

        // Optional single fractional part; "1." is not a number
        if self.peek() == Some('.') {
            self.pos += 1;
            if self.read_digits() == 0 {
                return Err(LexError::MalformedNumber {
                    text: self.slice(start),
                    position: start,
                });
            }
        }

        // Exponent is only consumed when digits follow, so `2e` stays `2` `e`
        if matches!(self.peek(), Some('e') | Some('E')) {
            let digits_at = match self.peek_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digits_at), Some(ch) if ch.is_ascii_digit()) {
                self.pos += digits_at;
                self.read_digits();
            }
        }

        let text = self.slice(start);
        match text.parse::<f64>() {
            Ok(n) => Ok(Token::new(TokenKind::Number(n), text, start)),
            Err(_) => Err(LexError::MalformedNumber {
                text,
                position: start,
            }),
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(ch) if is_identifier_continue(ch)) {
            self.pos += 1;
        }
        let text = self.slice(start);

        if text.eq_ignore_ascii_case("true") {
            return Token::new(TokenKind::Boolean(true), text, start);
        }
        if text.eq_ignore_ascii_case("false") {
            return Token::new(TokenKind::Boolean(false), text, start);
        }

        // Word operators are lowercase only so `AND(...)` stays a function call
        match text.as_str() {
            "null" => return Token::new(TokenKind::Null, text, start),
            "and" => return Token::new(TokenKind::Operator(Operator::AndAnd), text, start),
            "or" => return Token::new(TokenKind::Operator(Operator::OrOr), text, start),
            "not" => return Token::new(TokenKind::Operator(Operator::Bang), text, start),
            _ => {}
        }

        let call_head = self.next_non_whitespace() == Some('(');
        Token::new(TokenKind::Identifier { call_head }, text, start)
    }

    fn next_non_whitespace(&self) -> Option<char> {
        self.chars[self.pos..]
            .iter()
            .copied()
            .find(|ch| !ch.is_whitespace())
    }
}

/// Tokenizes the whole input. The returned vector always ends with EOF.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.is_eof();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
