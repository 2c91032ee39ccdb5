//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The Evaluator then traverses
//! this tree to compute the final result.
//!
//! SUPPORTED EXPRESSIONS:
//! - Literals: Numbers, Strings, Booleans, null
//! - Identifiers: revenue, cost_2024 (resolved against the evaluation context)
//! - List literals: [1, 2, 3]
//! - Binary operations: + - * / % ^ == != > < >= <= && ||
//! - Unary operations: - (negation), ! (logical not)
//! - Function calls: SUM(1, 2), IF(x > 0, "yes", "no")

use serde::Serialize;

/// Represents a parsed formula expression.
/// This is the core data structure that the evaluator will traverse.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Expression {
    /// A literal value: number, string, boolean or null.
    Literal(Literal),

    /// A named value looked up in the evaluation context.
    Identifier(String),

    /// A list literal like [1, 2, 3].
    List(Vec<Expression>),

    /// A binary operation: left op right (e.g., 5 + 3, x > 10).
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },

    /// A unary operation: op operand (e.g., -5, !done).
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// A function call like SUM(1, 2) or IF(x > 0, "yes", "no").
    /// The name is kept as written; the registry canonicalizes it.
    FunctionCall { name: String, args: Vec<Expression> },
}

/// Literal values that can appear in formulas.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// Binary operators for expressions.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
pub enum BinaryOperator {
    // Logical operators (lowest precedence)
    Or,  // ||
    And, // &&

    // Equality
    Equal,    // ==
    NotEqual, // !=

    // Relational
    GreaterThan,  // >
    LessThan,     // <
    GreaterEqual, // >=
    LessEqual,    // <=

    // Arithmetic operators
    Add,      // +
    Subtract, // -
    Multiply, // *
    Divide,   // /
    Modulo,   // %
    Power,    // ^ (highest precedence among binary ops)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Associativity {
    Left,
    Right,
}

impl BinaryOperator {
    /// Binding strength; larger binds tighter. Unary operators sit above `Power`.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            BinaryOperator::Equal | BinaryOperator::NotEqual => 3,
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterEqual
            | BinaryOperator::LessEqual => 4,
            BinaryOperator::Add | BinaryOperator::Subtract => 5,
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo => 6,
            BinaryOperator::Power => 7,
        }
    }

    pub fn associativity(&self) -> Associativity {
        match self {
            BinaryOperator::Power => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == 4
    }
}

/// Unary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum UnaryOperator {
    Negate, // -
    Not,    // !
}

impl Expression {
    /// Total number of nodes in the tree, this node included.
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Identifier(_) => 1,
            Expression::List(items) => 1 + items.iter().map(Expression::node_count).sum::<usize>(),
            Expression::BinaryOp { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Expression::UnaryOp { operand, .. } => 1 + operand.node_count(),
            Expression::FunctionCall { args, .. } => {
                1 + args.iter().map(Expression::node_count).sum::<usize>()
            }
        }
    }

    /// Names of every identifier referenced, in source order, without duplicates.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expression::Literal(_) => {}
            Expression::List(items) | Expression::FunctionCall { args: items, .. } => {
                for item in items {
                    item.collect_identifiers(names);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_identifiers(names),
        }
    }

    fn binary_precedence(&self) -> Option<u8> {
        match self {
            Expression::BinaryOp { op, .. } => Some(op.precedence()),
            _ => None,
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "^",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        f.write_str(symbol)
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "!"),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            // No escapes exist, so pick the delimiter the text doesn't contain
            Literal::String(s) if s.contains('"') => write!(f, "'{}'", s),
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Renders formula text that parses back to the same tree, adding only the
/// parentheses the precedence table requires.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal),
            Expression::Identifier(name) => f.write_str(name),
            Expression::List(items) => {
                f.write_str("[")?;
                write_comma_separated(f, items)?;
                f.write_str("]")
            }
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                write_comma_separated(f, args)?;
                f.write_str(")")
            }
            Expression::UnaryOp { op, operand } => {
                if operand.binary_precedence().is_some() {
                    write!(f, "{}({})", op, operand)
                } else {
                    write!(f, "{}{}", op, operand)
                }
            }
            Expression::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                let right_assoc = op.associativity() == Associativity::Right;

                let wrap_left = match left.binary_precedence() {
                    Some(p) => p < prec || (p == prec && right_assoc),
                    None => false,
                };
                let wrap_right = match right.binary_precedence() {
                    Some(p) => p < prec || (p == prec && !right_assoc),
                    None => false,
                };

                write_operand(f, left, wrap_left)?;
                write!(f, " {} ", op)?;
                write_operand(f, right, wrap_right)
            }
        }
    }
}

fn write_operand(f: &mut std::fmt::Formatter<'_>, expr: &Expression, wrap: bool) -> std::fmt::Result {
    if wrap {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

fn write_comma_separated(f: &mut std::fmt::Formatter<'_>, items: &[Expression]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
