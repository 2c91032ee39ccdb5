//! FILENAME: core/engine/src/evaluator.rs
//! PURPOSE: Evaluates AST expressions against a value context.
//! CONTEXT: After a formula is parsed into an AST, this module traverses
//! the tree and computes the final result. Identifiers are looked up in the
//! caller's Context; function calls are dispatched through the registry.
//!
//! SUPPORTED FEATURES:
//! - Literal evaluation: Numbers, Strings, Booleans, Null, Lists
//! - Identifier lookup (case-sensitive, never defaulted)
//! - Binary operations: +, -, *, /, %, ^, ==, !=, <, >, <=, >=, &&, ||
//! - Unary operations: - (negation), ! (logical not)
//! - Function calls through the FunctionRegistry, with arity checking
//! - Optional recording of intermediate results for step-by-step views

use crate::context::Context;
use crate::error::{EvalResult, EvaluationError};
use crate::registry::FunctionRegistry;
use crate::trace::EvaluationStep;
use crate::value::Value;
use formula_parser::{BinaryOperator, Expression, Literal, UnaryOperator};
use std::cell::RefCell;

/// The formula evaluator.
/// Holds references to the registry and the context for the duration of one
/// evaluation; neither is modified.
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    context: &'a Context,
    /// Intermediate results, collected only when tracing is enabled.
    trace: Option<RefCell<Vec<EvaluationStep>>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, context: &'a Context) -> Self {
        Evaluator {
            registry,
            context,
            trace: None,
        }
    }

    /// Creates an evaluator that records each operator and call result.
    pub fn with_trace(registry: &'a FunctionRegistry, context: &'a Context) -> Self {
        Evaluator {
            registry,
            context,
            trace: Some(RefCell::new(Vec::new())),
        }
    }

    /// Takes the recorded steps, leaving the trace empty.
    pub fn take_steps(&self) -> Vec<EvaluationStep> {
        self.trace
            .as_ref()
            .map(|steps| steps.take())
            .unwrap_or_default()
    }

    /// Evaluates an AST expression and returns the result.
    pub fn evaluate(&self, expr: &Expression) -> EvalResult<Value> {
        match expr {
            Expression::Literal(literal) => Ok(self.eval_literal(literal)),
            Expression::Identifier(name) => self.eval_identifier(name),
            Expression::List(items) => items
                .iter()
                .map(|item| self.evaluate(item))
                .collect::<EvalResult<Vec<_>>>()
                .map(Value::List),
            Expression::BinaryOp { left, op, right } => {
                let result = self.eval_binary_op(left, *op, right)?;
                self.record(expr, format!("Apply {}", op), &result);
                Ok(result)
            }
            Expression::UnaryOp { op, operand } => {
                let result = self.eval_unary_op(*op, operand)?;
                let description = match op {
                    UnaryOperator::Negate => "Negate",
                    UnaryOperator::Not => "Logical not",
                };
                self.record(expr, description.to_string(), &result);
                Ok(result)
            }
            Expression::FunctionCall { name, args } => {
                let result = self.eval_function(name, args)?;
                self.record(expr, format!("Call {}", name.to_uppercase()), &result);
                Ok(result)
            }
        }
    }

    fn record(&self, expr: &Expression, description: String, result: &Value) {
        if let Some(trace) = &self.trace {
            let mut steps = trace.borrow_mut();
            let step = steps.len() + 1;
            steps.push(EvaluationStep {
                step,
                description,
                expression: expr.to_string(),
                result: result.clone(),
            });
        }
    }

    fn eval_literal(&self, literal: &Literal) -> Value {
        match literal {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Boolean(b) => Value::Boolean(*b),
            Literal::Null => Value::Null,
        }
    }

    fn eval_identifier(&self, name: &str) -> EvalResult<Value> {
        self.context
            .get(name)
            .cloned()
            .ok_or_else(|| EvaluationError::UnknownIdentifier {
                name: name.to_string(),
            })
    }

    /// Evaluates a binary operation. `&&` and `||` short-circuit; every other
    /// operator evaluates the left operand, then the right.
    fn eval_binary_op(
        &self,
        left: &Expression,
        op: BinaryOperator,
        right: &Expression,
    ) -> EvalResult<Value> {
        match op {
            BinaryOperator::And => {
                let left_val = self.evaluate(left)?;
                if !left_val.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            BinaryOperator::Or => {
                let left_val = self.evaluate(left)?;
                if left_val.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            _ => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                match op {
                    BinaryOperator::Equal => Ok(Value::Boolean(left_val == right_val)),
                    BinaryOperator::NotEqual => Ok(Value::Boolean(left_val != right_val)),
                    _ if op.is_comparison() => self.eval_comparison(op, &left_val, &right_val),
                    _ => self.eval_arithmetic(op, &left_val, &right_val),
                }
            }
        }
    }

    /// Arithmetic on two number-coercible operands. Division and modulo by
    /// zero follow IEEE-754 (Infinity or NaN).
    fn eval_arithmetic(&self, op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
        let l = self.operand_number(op, left)?;
        let r = self.operand_number(op, right)?;
        let result = match op {
            BinaryOperator::Add => l + r,
            BinaryOperator::Subtract => l - r,
            BinaryOperator::Multiply => l * r,
            BinaryOperator::Divide => l / r,
            BinaryOperator::Modulo => l % r,
            BinaryOperator::Power => l.powf(r),
            _ => {
                return Err(EvaluationError::type_mismatch(
                    op.to_string(),
                    "arithmetic operator",
                    "non-arithmetic operator",
                ))
            }
        };
        Ok(Value::Number(result))
    }

    fn operand_number(&self, op: BinaryOperator, value: &Value) -> EvalResult<f64> {
        value
            .as_number()
            .ok_or_else(|| EvaluationError::type_mismatch(op.to_string(), "number", value.type_name()))
    }

    /// Relational comparison of two dates or two number-coercible values.
    fn eval_comparison(&self, op: BinaryOperator, left: &Value, right: &Value) -> EvalResult<Value> {
        let result = match (left, right) {
            (Value::DateTime(l), Value::DateTime(r)) => compare_with(op, l, r),
            _ => match (left.as_number(), right.as_number()) {
                (Some(l), Some(r)) => compare_with(op, &l, &r),
                _ => {
                    return Err(EvaluationError::type_mismatch(
                        op.to_string(),
                        "two numbers or two dates",
                        format!("{} and {}", left.type_name(), right.type_name()),
                    ))
                }
            },
        };
        Ok(Value::Boolean(result))
    }

    /// Evaluates a unary operation.
    fn eval_unary_op(&self, op: UnaryOperator, operand: &Expression) -> EvalResult<Value> {
        let val = self.evaluate(operand)?;
        match op {
            UnaryOperator::Negate => match val.as_number() {
                Some(n) => Ok(Value::Number(-n)),
                None => Err(EvaluationError::type_mismatch(
                    "negation",
                    "number",
                    val.type_name(),
                )),
            },
            UnaryOperator::Not => Ok(Value::Boolean(!val.is_truthy())),
        }
    }

    /// Evaluates a function call: resolve, check arity, evaluate arguments
    /// left to right, then invoke.
    fn eval_function(&self, name: &str, args: &[Expression]) -> EvalResult<Value> {
        let descriptor =
            self.registry
                .lookup(name)
                .ok_or_else(|| EvaluationError::UnknownFunction {
                    name: name.to_uppercase(),
                })?;

        if !descriptor.arity.accepts(args.len()) {
            return Err(EvaluationError::ArityMismatch {
                name: descriptor.name.clone(),
                expected: descriptor.arity,
                actual: args.len(),
            });
        }

        let values = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<EvalResult<Vec<_>>>()?;

        log::trace!("calling {} with {} argument(s)", descriptor.name, values.len());
        descriptor.call(&values)
    }
}

fn compare_with<T: PartialOrd>(op: BinaryOperator, l: &T, r: &T) -> bool {
    match op {
        BinaryOperator::GreaterThan => l > r,
        BinaryOperator::LessThan => l < r,
        BinaryOperator::GreaterEqual => l >= r,
        BinaryOperator::LessEqual => l <= r,
        _ => false,
    }
}

/// Evaluates `expr` against `context`, dispatching calls through `registry`.
pub fn evaluate(
    expr: &Expression,
    context: &Context,
    registry: &FunctionRegistry,
) -> EvalResult<Value> {
    Evaluator::new(registry, context).evaluate(expr)
}
