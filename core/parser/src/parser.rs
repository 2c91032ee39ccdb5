//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Precedence-climbing parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes the
//! token vector from the Lexer and builds an Expression tree that can be evaluated.
//!
//! GRAMMAR:
//!   expression     --> unary ( BINARY_OP expression )*     // climbed by precedence
//!   unary          --> ("-" | "!") unary | primary
//!   primary        --> NUMBER | STRING | BOOLEAN | NULL | IDENTIFIER
//!                    | function_call | list | "(" expression ")"
//!   function_call  --> IDENTIFIER "(" arguments? ")"
//!   list           --> "[" arguments? "]"
//!   arguments      --> expression ("," expression)*
//!
//! PRECEDENCE (loosest first): || , && , == != , > < >= <= , + - , * / % , ^ (right)
//! Unary operators bind tighter than every binary operator.

use crate::ast::{Associativity, BinaryOperator, Expression, Literal, UnaryOperator};
use crate::error::{ErrorCategory, ParseError, ParseResult};
use crate::lexer::tokenize;
use crate::token::{Operator, Token, TokenKind};

/// Nesting limit applied when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// The delimiter that closes the group currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Group {
    TopLevel,
    Paren,
    Call,
    List,
}

/// The Parser struct holds the token vector and cursor state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    /// Open '(' currently unclosed, used to classify stray ')'
    open_parens: usize,
    /// Open call argument lists and list literals, used to classify stray ','
    open_lists: usize,
}

impl Parser {
    /// Creates a parser over a token vector produced by `tokenize`.
    /// An EOF token is appended if the vector lacks one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens.last().map(|t| t.position + t.text.chars().count()).unwrap_or(0);
            tokens.push(Token::new(TokenKind::EOF, "", end));
        }
        Parser {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            open_parens: 0,
            open_lists: 0,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses the entire token stream and returns the AST.
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.current().is_eof() {
            return Err(ParseError::new(ErrorCategory::EmptyExpression, "Empty expression").at(0));
        }

        let expr = self.parse_expression(0)?;

        // Ensure we consumed all tokens
        if !self.current().is_eof() {
            return Err(self.unexpected_after_operand(Group::TopLevel));
        }

        Ok(expr)
    }

    fn current(&self) -> &Token {
        // Parser::new guarantees a trailing EOF and advance never passes it
        &self.tokens[self.pos]
    }

    /// Advances to the next token, staying on EOF once reached.
    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn descend(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                ErrorCategory::Syntax,
                format!("Expression nests deeper than {} levels", self.max_depth),
            )
            .at(self.current().position));
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    /// Maps the current token to a binary operator, if it is one.
    fn current_binary_operator(&self) -> Option<BinaryOperator> {
        let op = match self.current().operator()? {
            Operator::Plus => BinaryOperator::Add,
            Operator::Minus => BinaryOperator::Subtract,
            Operator::Asterisk => BinaryOperator::Multiply,
            Operator::Slash => BinaryOperator::Divide,
            Operator::Percent => BinaryOperator::Modulo,
            Operator::Caret => BinaryOperator::Power,
            Operator::EqualEqual => BinaryOperator::Equal,
            Operator::NotEqual => BinaryOperator::NotEqual,
            Operator::GreaterThan => BinaryOperator::GreaterThan,
            Operator::LessThan => BinaryOperator::LessThan,
            Operator::GreaterEqual => BinaryOperator::GreaterEqual,
            Operator::LessEqual => BinaryOperator::LessEqual,
            Operator::AndAnd => BinaryOperator::And,
            Operator::OrOr => BinaryOperator::Or,
            Operator::Bang => return None,
        };
        Some(op)
    }

    /// Precedence climbing: parses operators binding at least as tightly as `min_prec`.
    ///
    /// Each operator folded into `left` deepens the tree by one level and
    /// holds a depth slot until the loop ends, so `1 + 1 + ... + 1` counts
    /// against the nesting limit like parentheses do.
    fn parse_expression(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;
        let mut folds = 0;

        while let Some(op) = self.current_binary_operator() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance();

            let next_min = match op.associativity() {
                Associativity::Left => prec + 1,
                Associativity::Right => prec,
            };

            self.descend()?;
            folds += 1;
            let right = self.parse_expression(next_min)?;

            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }

        self.depth -= folds;
        Ok(left)
    }

    /// Parses prefix operators (negation and logical not).
    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current().operator() {
            Some(Operator::Minus) => UnaryOperator::Negate,
            Some(Operator::Bang) => UnaryOperator::Not,
            _ => return self.parse_primary(),
        };
        self.advance();

        self.descend()?;
        let operand = self.parse_unary()?;
        self.ascend();

        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses primary expressions (literals, identifiers, calls, lists, parentheses).
    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expression::Literal(Literal::Number(n)))
            }

            TokenKind::String(s) => {
                self.advance();
                Ok(Expression::Literal(Literal::String(s)))
            }

            TokenKind::Boolean(b) => {
                self.advance();
                Ok(Expression::Literal(Literal::Boolean(b)))
            }

            TokenKind::Null => {
                self.advance();
                Ok(Expression::Literal(Literal::Null))
            }

            TokenKind::Identifier { call_head: true } => {
                self.advance();
                self.parse_function_call(token.text)
            }

            TokenKind::Identifier { call_head: false } => {
                self.advance();
                Ok(Expression::Identifier(token.text))
            }

            // Parenthesized expression
            TokenKind::LParen => {
                self.advance();
                self.open_parens += 1;
                self.descend()?;
                let expr = self.parse_expression(0)?;
                self.ascend();
                if self.current().kind != TokenKind::RParen {
                    return Err(self.unexpected_after_operand(Group::Paren));
                }
                self.advance();
                self.open_parens -= 1;
                Ok(expr)
            }

            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_arguments(Group::List)?;
                Ok(Expression::List(items))
            }

            // Error cases
            TokenKind::EOF => Err(ParseError::new(
                ErrorCategory::Syntax,
                format!("Unexpected end of expression (position {})", token.position),
            )
            .at(token.position)),

            TokenKind::RParen if self.open_parens == 0 && self.open_lists == 0 => Err(ParseError::new(
                ErrorCategory::UnbalancedParentheses,
                format!("Unmatched parenthesis ')' at position {}", token.position),
            )
            .at(token.position)),

            TokenKind::Comma if self.open_lists == 0 => Err(comma_outside_call(&token)),

            TokenKind::Operator(op) => Err(ParseError::new(
                ErrorCategory::UnexpectedToken,
                format!(
                    "Unexpected operator '{}' at position {}",
                    op.symbol(),
                    token.position
                ),
            )
            .at(token.position)),

            _ => Err(ParseError::new(
                ErrorCategory::UnexpectedToken,
                format!("Unexpected token {} at position {}", token, token.position),
            )
            .at(token.position)),
        }
    }

    /// Parses a function call like SUM(1, 2, 10) after its name.
    fn parse_function_call(&mut self, name: String) -> ParseResult<Expression> {
        // The lexer only tags call heads that are followed by '('
        if self.current().kind != TokenKind::LParen {
            return Err(self.unexpected_after_operand(Group::TopLevel));
        }
        self.advance();

        let args = self.parse_arguments(Group::Call)?;

        Ok(Expression::FunctionCall { name, args })
    }

    /// Parses a comma-separated list up to and including its closing delimiter.
    fn parse_arguments(&mut self, group: Group) -> ParseResult<Vec<Expression>> {
        let closer = match group {
            Group::List => TokenKind::RBracket,
            _ => TokenKind::RParen,
        };

        let mut args = Vec::new();
        self.open_lists += 1;

        // Handle empty argument list
        if self.current().kind == closer {
            self.advance();
            self.open_lists -= 1;
            return Ok(args);
        }

        self.descend()?;
        loop {
            args.push(self.parse_expression(0)?);

            if self.current().kind == TokenKind::Comma {
                self.advance();
                continue;
            }
            if self.current().kind == closer {
                self.advance();
                break;
            }
            return Err(self.unexpected_after_operand(group));
        }
        self.ascend();
        self.open_lists -= 1;

        Ok(args)
    }

    /// Builds the error for a token that follows a complete operand but
    /// neither continues the expression nor closes the enclosing group.
    fn unexpected_after_operand(&self, group: Group) -> ParseError {
        let token = self.current();
        let position = token.position;

        let error = match &token.kind {
            TokenKind::EOF => match group {
                Group::List => ParseError::new(
                    ErrorCategory::UnbalancedParentheses,
                    format!("Bracket ']' expected (position {})", position),
                ),
                _ => ParseError::new(
                    ErrorCategory::UnbalancedParentheses,
                    format!("Parenthesis ')' expected (position {})", position),
                ),
            },
            TokenKind::RParen | TokenKind::RBracket => ParseError::new(
                ErrorCategory::UnbalancedParentheses,
                format!("Unmatched {} at position {}", token, position),
            ),
            TokenKind::Comma => comma_outside_call(token),
            _ if token.starts_operand() => ParseError::new(
                ErrorCategory::UnexpectedToken,
                format!(
                    "Unexpected token {} at position {}: operator expected between operands",
                    token, position
                ),
            ),
            _ => ParseError::new(
                ErrorCategory::UnexpectedToken,
                format!("Unexpected token {} at position {}", token, position),
            ),
        };

        error.at(position)
    }
}

fn comma_outside_call(token: &Token) -> ParseError {
    ParseError::new(
        ErrorCategory::UnexpectedToken,
        format!(
            "Unexpected ',' at position {}: commas only separate function arguments",
            token.position
        ),
    )
    .at(token.position)
}

/// Convenience function to tokenize and parse a formula string directly.
pub fn parse(input: &str) -> ParseResult<Expression> {
    parse_with_max_depth(input, DEFAULT_MAX_DEPTH)
}

/// Like `parse`, with an explicit nesting limit.
pub fn parse_with_max_depth(input: &str, max_depth: usize) -> ParseResult<Expression> {
    let tokens = tokenize(input)?;
    Parser::new(tokens).with_max_depth(max_depth).parse()
}
