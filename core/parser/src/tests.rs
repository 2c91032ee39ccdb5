//! FILENAME: core/parser/src/tests.rs
//! PURPOSE: Consolidated unit tests for the parser crate.

use crate::ast::{BinaryOperator, Expression, Literal, UnaryOperator};
use crate::error::{ErrorCategory, LexError};
use crate::lexer::{tokenize, Lexer};
use crate::parser::{parse, parse_with_max_depth, Parser};
use crate::token::{Operator, TokenKind};

fn num(n: f64) -> Expression {
    Expression::Literal(Literal::Number(n))
}

fn ident(name: &str) -> Expression {
    Expression::Identifier(name.to_string())
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn error_category(input: &str) -> ErrorCategory {
    parse(input).unwrap_err().category
}

// ========================================
// LEXER TESTS
// ========================================

#[test]
fn lexer_tokenizes_simple_math() {
    let mut lexer = Lexer::new("1 + 2");

    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number(1.0));
    assert_eq!(
        lexer.next_token().unwrap().kind,
        TokenKind::Operator(Operator::Plus)
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number(2.0));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EOF);
}

#[test]
fn lexer_records_positions_and_text() {
    let tokens = tokenize("  revenue >= 10.5").unwrap();

    assert_eq!(tokens[0].text, "revenue");
    assert_eq!(tokens[0].position, 2);
    assert_eq!(tokens[1].text, ">=");
    assert_eq!(tokens[1].position, 10);
    assert_eq!(tokens[2].text, "10.5");
    assert_eq!(tokens[2].position, 13);
    assert!(tokens[3].is_eof());
}

#[test]
fn lexer_tags_function_call_heads() {
    let tokens = tokenize("SUM (x, y)").unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier { call_head: true });
    assert_eq!(tokens[2].kind, TokenKind::Identifier { call_head: false });
    assert_eq!(tokens[4].kind, TokenKind::Identifier { call_head: false });
}

#[test]
fn lexer_tokenizes_comparison_operators() {
    assert_eq!(
        kinds("< > <= >= == !="),
        vec![
            TokenKind::Operator(Operator::LessThan),
            TokenKind::Operator(Operator::GreaterThan),
            TokenKind::Operator(Operator::LessEqual),
            TokenKind::Operator(Operator::GreaterEqual),
            TokenKind::Operator(Operator::EqualEqual),
            TokenKind::Operator(Operator::NotEqual),
            TokenKind::EOF,
        ]
    );
}

#[test]
fn lexer_tokenizes_logical_operators_and_words() {
    assert_eq!(
        kinds("a && b || !c and d or not e"),
        vec![
            TokenKind::Identifier { call_head: false },
            TokenKind::Operator(Operator::AndAnd),
            TokenKind::Identifier { call_head: false },
            TokenKind::Operator(Operator::OrOr),
            TokenKind::Operator(Operator::Bang),
            TokenKind::Identifier { call_head: false },
            TokenKind::Operator(Operator::AndAnd),
            TokenKind::Identifier { call_head: false },
            TokenKind::Operator(Operator::OrOr),
            TokenKind::Operator(Operator::Bang),
            TokenKind::Identifier { call_head: false },
            TokenKind::EOF,
        ]
    );
}

#[test]
fn lexer_keeps_uppercase_and_as_function_name() {
    let tokens = tokenize("AND(true, FALSE)").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier { call_head: true });
    assert_eq!(tokens[2].kind, TokenKind::Boolean(true));
    assert_eq!(tokens[4].kind, TokenKind::Boolean(false));
}

#[test]
fn lexer_handles_both_quote_styles_without_escapes() {
    assert_eq!(
        kinds("\"it's\" 'say \"hi\"'"),
        vec![
            TokenKind::String("it's".to_string()),
            TokenKind::String("say \"hi\"".to_string()),
            TokenKind::EOF,
        ]
    );
}

#[test]
fn lexer_reads_exponent_only_when_digits_follow() {
    assert_eq!(
        kinds("1.5e3 2e"),
        vec![
            TokenKind::Number(1500.0),
            TokenKind::Number(2.0),
            TokenKind::Identifier { call_head: false },
            TokenKind::EOF,
        ]
    );
}

#[test]
fn lexer_rejects_unterminated_string() {
    assert_eq!(
        tokenize("CONCAT(\"abc").unwrap_err(),
        LexError::UnterminatedString { position: 7 }
    );
}

#[test]
fn lexer_rejects_unknown_character() {
    assert_eq!(
        tokenize("1 # 2").unwrap_err(),
        LexError::UnexpectedCharacter { ch: '#', position: 2 }
    );
}

#[test]
fn lexer_rejects_single_equals_and_ampersand() {
    assert!(matches!(
        tokenize("a = b"),
        Err(LexError::UnexpectedCharacter { ch: '=', position: 2 })
    ));
    assert!(matches!(
        tokenize("a & b"),
        Err(LexError::UnexpectedCharacter { ch: '&', position: 2 })
    ));
}

#[test]
fn lexer_rejects_dangling_decimal_point() {
    assert!(matches!(
        tokenize("1. + 2"),
        Err(LexError::MalformedNumber { position: 0, .. })
    ));
}

// ========================================
// PARSER TESTS - LITERALS
// ========================================

#[test]
fn parser_parses_number_literal() {
    assert_eq!(parse("42").unwrap(), num(42.0));
}

#[test]
fn parser_parses_decimal_number() {
    assert_eq!(parse("3.14159").unwrap(), num(3.14159));
}

#[test]
fn parser_parses_string_literal() {
    assert_eq!(
        parse("\"Hello World\"").unwrap(),
        Expression::Literal(Literal::String("Hello World".to_string()))
    );
}

#[test]
fn parser_parses_boolean_and_null() {
    assert_eq!(parse("TRUE").unwrap(), Expression::Literal(Literal::Boolean(true)));
    assert_eq!(parse("false").unwrap(), Expression::Literal(Literal::Boolean(false)));
    assert_eq!(parse("null").unwrap(), Expression::Literal(Literal::Null));
}

#[test]
fn parser_parses_identifier_case_preserved() {
    assert_eq!(parse("unitPrice").unwrap(), ident("unitPrice"));
}

#[test]
fn parser_parses_list_literal() {
    assert_eq!(
        parse("[1, 2, x]").unwrap(),
        Expression::List(vec![num(1.0), num(2.0), ident("x")])
    );
    assert_eq!(parse("[]").unwrap(), Expression::List(vec![]));
}

// ========================================
// PARSER TESTS - PRECEDENCE & ASSOCIATIVITY
// ========================================

#[test]
fn parser_multiplication_binds_tighter_than_addition() {
    assert_eq!(
        parse("2 + 3 * 4").unwrap(),
        binary(
            num(2.0),
            BinaryOperator::Add,
            binary(num(3.0), BinaryOperator::Multiply, num(4.0))
        )
    );
}

#[test]
fn parser_parentheses_override_precedence() {
    assert_eq!(
        parse("(2 + 3) * 4").unwrap(),
        binary(
            binary(num(2.0), BinaryOperator::Add, num(3.0)),
            BinaryOperator::Multiply,
            num(4.0)
        )
    );
}

#[test]
fn parser_power_is_right_associative() {
    assert_eq!(
        parse("2^3^2").unwrap(),
        binary(
            num(2.0),
            BinaryOperator::Power,
            binary(num(3.0), BinaryOperator::Power, num(2.0))
        )
    );
}

#[test]
fn parser_division_is_left_associative() {
    assert_eq!(
        parse("8 / 2 * 3").unwrap(),
        binary(
            binary(num(8.0), BinaryOperator::Divide, num(2.0)),
            BinaryOperator::Multiply,
            num(3.0)
        )
    );
}

#[test]
fn parser_subtraction_is_left_associative() {
    assert_eq!(
        parse("10 - 4 - 3").unwrap(),
        binary(
            binary(num(10.0), BinaryOperator::Subtract, num(4.0)),
            BinaryOperator::Subtract,
            num(3.0)
        )
    );
}

#[test]
fn parser_unary_binds_tighter_than_power() {
    assert_eq!(
        parse("-2^2").unwrap(),
        binary(
            Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(num(2.0)),
            },
            BinaryOperator::Power,
            num(2.0)
        )
    );
}

#[test]
fn parser_accepts_negative_exponent() {
    assert_eq!(
        parse("2 ^ -1").unwrap(),
        binary(
            num(2.0),
            BinaryOperator::Power,
            Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(num(1.0)),
            }
        )
    );
}

#[test]
fn parser_logical_precedence_chain() {
    // a || b && c == d > e + f
    let expected = binary(
        ident("a"),
        BinaryOperator::Or,
        binary(
            ident("b"),
            BinaryOperator::And,
            binary(
                ident("c"),
                BinaryOperator::Equal,
                binary(
                    ident("d"),
                    BinaryOperator::GreaterThan,
                    binary(ident("e"), BinaryOperator::Add, ident("f")),
                ),
            ),
        ),
    );
    assert_eq!(parse("a || b && c == d > e + f").unwrap(), expected);
}

#[test]
fn parser_double_not() {
    assert_eq!(
        parse("!!done").unwrap(),
        Expression::UnaryOp {
            op: UnaryOperator::Not,
            operand: Box::new(Expression::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(ident("done")),
            }),
        }
    );
}

// ========================================
// PARSER TESTS - FUNCTIONS
// ========================================

#[test]
fn parser_parses_function_call() {
    assert_eq!(
        parse("SUM(1, x)").unwrap(),
        Expression::FunctionCall {
            name: "SUM".to_string(),
            args: vec![num(1.0), ident("x")],
        }
    );
}

#[test]
fn parser_parses_empty_argument_list() {
    assert_eq!(
        parse("NOW()").unwrap(),
        Expression::FunctionCall {
            name: "NOW".to_string(),
            args: vec![],
        }
    );
}

#[test]
fn parser_parses_nested_calls_with_full_expressions() {
    let expr = parse("IF(a > 1 || b, MAX(1, 2) * 2, \"no\")").unwrap();
    match expr {
        Expression::FunctionCall { name, args } => {
            assert_eq!(name, "IF");
            assert_eq!(args.len(), 3);
            assert!(matches!(
                args[0],
                Expression::BinaryOp { op: BinaryOperator::Or, .. }
            ));
            assert!(matches!(
                args[1],
                Expression::BinaryOp { op: BinaryOperator::Multiply, .. }
            ));
        }
        other => panic!("Expected function call, got {:?}", other),
    }
}

// ========================================
// PARSER TESTS - ERRORS
// ========================================

#[test]
fn parser_rejects_empty_input() {
    assert_eq!(error_category(""), ErrorCategory::EmptyExpression);
    assert_eq!(error_category("   \t\n"), ErrorCategory::EmptyExpression);
}

#[test]
fn parser_rejects_trailing_operator() {
    let category = error_category("1 +");
    assert!(matches!(
        category,
        ErrorCategory::Syntax | ErrorCategory::UnexpectedToken
    ));
}

#[test]
fn parser_rejects_leading_binary_operator() {
    assert_eq!(error_category("* 2"), ErrorCategory::UnexpectedToken);
    assert_eq!(error_category("1 + * 2"), ErrorCategory::UnexpectedToken);
}

#[test]
fn parser_rejects_unbalanced_parentheses() {
    assert_eq!(error_category("(1 + 2"), ErrorCategory::UnbalancedParentheses);
    assert_eq!(error_category("1 + 2)"), ErrorCategory::UnbalancedParentheses);
    assert_eq!(error_category("SUM(1, 2"), ErrorCategory::UnbalancedParentheses);
    assert_eq!(error_category("[1, 2"), ErrorCategory::UnbalancedParentheses);
    assert_eq!(error_category(")"), ErrorCategory::UnbalancedParentheses);
}

#[test]
fn parser_unbalanced_message_mentions_parenthesis() {
    let err = parse("(1 + 2").unwrap_err();
    assert!(err.message.contains("Parenthesis"));
    assert_eq!(err.position, Some(6));
}

#[test]
fn parser_rejects_comma_outside_call() {
    assert_eq!(error_category("1, 2"), ErrorCategory::UnexpectedToken);
    assert_eq!(error_category("(1, 2)"), ErrorCategory::UnexpectedToken);
}

#[test]
fn parser_rejects_adjacent_operands() {
    let err = parse("1 2").unwrap_err();
    assert_eq!(err.category, ErrorCategory::UnexpectedToken);
    assert_eq!(err.position, Some(2));
    assert_eq!(error_category("x y"), ErrorCategory::UnexpectedToken);
    assert_eq!(error_category("(1) (2)"), ErrorCategory::UnexpectedToken);
}

#[test]
fn parser_rejects_missing_arguments() {
    assert_eq!(error_category("SUM(1,)"), ErrorCategory::UnexpectedToken);
    assert_eq!(error_category("SUM(,1)"), ErrorCategory::UnexpectedToken);
    assert_eq!(error_category("()"), ErrorCategory::UnexpectedToken);
}

#[test]
fn parser_maps_lex_errors_to_categories() {
    assert_eq!(error_category("\"open"), ErrorCategory::Syntax);
    assert_eq!(error_category("1 $ 2"), ErrorCategory::UnexpectedToken);
}

#[test]
fn parser_enforces_depth_limit() {
    let deep = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    assert!(parse_with_max_depth(&deep, 100).is_ok());

    let err = parse_with_max_depth(&deep, 10).unwrap_err();
    assert_eq!(err.category, ErrorCategory::Syntax);
}

#[test]
fn parser_bounds_left_associative_chains() {
    let chain = |terms: usize| vec!["1"; terms].join(" + ");

    let short = parse_with_max_depth(&chain(50), 100).unwrap();
    assert_eq!(short.node_count(), 99);

    let err = parse_with_max_depth(&chain(150), 100).unwrap_err();
    assert_eq!(err.category, ErrorCategory::Syntax);
    assert!(err.message.contains("deeper than 100"));

    assert!(parse(&chain(100_000)).is_err());
}

#[test]
fn parser_releases_depth_after_each_chain() {
    // Sibling chains inside a call do not accumulate depth
    let args = vec!["1 + 1 + 1 + 1"; 50].join(", ");
    assert!(parse_with_max_depth(&format!("SUM({})", args), 8).is_ok());
}

#[test]
fn parser_error_display_uses_parse_error_prefix() {
    let err = parse("").unwrap_err();
    assert_eq!(err.to_string(), "Parse error: Empty expression");
}

#[test]
fn parser_accepts_token_vector_directly() {
    let tokens = tokenize("x * 2").unwrap();
    let expr = Parser::new(tokens).parse().unwrap();
    assert_eq!(expr, binary(ident("x"), BinaryOperator::Multiply, num(2.0)));
}

// ========================================
// AST TESTS
// ========================================

#[test]
fn parsing_twice_yields_equal_trees() {
    let input = "IF(score >= 90 && !late, ROUND(score / 3, 2), [1, \"a\", null])";
    assert_eq!(parse(input).unwrap(), parse(input).unwrap());
}

#[test]
fn display_reparses_to_same_tree() {
    let inputs = [
        "2 + 3 * 4",
        "(2 + 3) * 4",
        "2 ^ (3 ^ 2)",
        "(2 ^ 3) ^ 2",
        "10 - (4 - 3)",
        "-(a + b) * !c",
        "-2 ^ 2",
        "IF(x > 1 || y, \"it's\", 'say \"hi\"')",
        "[1, 2.5, null, true]",
        "a % b % c",
    ];
    for input in inputs {
        let expr = parse(input).unwrap();
        let rendered = expr.to_string();
        assert_eq!(parse(&rendered).unwrap(), expr, "round trip of {}", input);
    }
}

#[test]
fn display_uses_minimal_parentheses() {
    assert_eq!(parse("(2 + (3 * 4))").unwrap().to_string(), "2 + 3 * 4");
    assert_eq!(parse("2^(3^2)").unwrap().to_string(), "2 ^ 3 ^ 2");
    assert_eq!(parse("(2^3)^2").unwrap().to_string(), "(2 ^ 3) ^ 2");
}

#[test]
fn node_count_and_identifiers() {
    let expr = parse("SUM(a, b * a, 3)").unwrap();
    assert_eq!(expr.node_count(), 6);
    assert_eq!(expr.identifiers(), vec!["a", "b"]);
}

#[test]
fn error_category_serializes_kebab_case() {
    let json = serde_json::to_string(&ErrorCategory::UnbalancedParentheses).unwrap();
    assert_eq!(json, "\"unbalanced-parentheses\"");
    assert_eq!(ErrorCategory::ALL.len(), 4);
}
