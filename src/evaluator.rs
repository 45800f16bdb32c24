use crate::environment::{Binding, EnvError, Environment};
use crate::source::Span;
use crate::types::{Atom, Expression, Keyword};
use log::trace;
use std::collections::HashSet;
use thiserror::Error;

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    EnvError(#[from] EnvError), // Unbound symbols and redefinitions
    #[error("Evaluation Error: Invalid arguments - {0}")]
    InvalidArguments(String, Span), // Mismatched arity or wrong type of args to a primitive
    #[error("Evaluation Error: Expected a symbol, but got: {0}")]
    NotASymbol(Expression, Span), // Expected a bare symbol (define target)
    #[error("Evaluation Error: Invalid special form - {0}")]
    InvalidSpecialForm(String, Span), // Malformed special form (e.g., (if cond))
    #[error("Evaluation Error: Expected a {expected}, but got: {found}")]
    TypeMismatch {
        expected: &'static str,
        found: Atom,
        span: Span,
    },
    #[error("Evaluation Error: No program has been parsed")]
    NoProgram,
}

impl EvalError {
    /// The source span the error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::EnvError(EnvError::UnboundSymbol(_, span))
            | EvalError::EnvError(EnvError::AlreadyDefined(_, span))
            | EvalError::InvalidArguments(_, span)
            | EvalError::NotASymbol(_, span)
            | EvalError::InvalidSpecialForm(_, span)
            | EvalError::TypeMismatch { span, .. } => Some(*span),
            EvalError::NoProgram => None,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Expression> = Result<T, EvalError>;

/// Names that are handled by the evaluator rather than looked up.
pub fn special_form_identifiers() -> HashSet<String> {
    Keyword::ALL
        .iter()
        .map(|keyword| keyword.as_str().to_string())
        .collect()
}

// --- Evaluate Function ---

/// Evaluates an expression against the environment.
///
/// Evaluation is strictly left to right and depth first. Recursion depth
/// equals the nesting depth of `expr`.
pub fn evaluate(expr: &Expression, env: &mut Environment) -> EvalResult {
    match &expr.head {
        Atom::Keyword(keyword) => evaluate_special_form(*keyword, expr, env),
        Atom::Symbol(name) => evaluate_symbol(name, expr, env),
        // Self-evaluating literals
        Atom::None | Atom::Boolean(_) | Atom::Number(_) => Ok(expr.clone()),
    }
}

fn evaluate_special_form(keyword: Keyword, expr: &Expression, env: &mut Environment) -> EvalResult {
    trace!("special form `{}` with {} operands", keyword, expr.tail.len());
    match keyword {
        Keyword::Begin => evaluate_begin(&expr.tail, env, expr.span),
        Keyword::Define => evaluate_define(&expr.tail, env, expr.span),
        Keyword::If => evaluate_if(&expr.tail, env, expr.span),
    }
}

fn evaluate_symbol(name: &str, expr: &Expression, env: &mut Environment) -> EvalResult {
    let procedure = match env.get(name, expr.span)? {
        Binding::Value(value) => return Ok(value.clone()),
        Binding::Procedure(procedure) => *procedure,
    };

    // Arguments are evaluated eagerly; only their head atoms reach the primitive
    let mut args = Vec::with_capacity(expr.tail.len());
    for operand in &expr.tail {
        args.push(evaluate(operand, env)?.head);
    }

    trace!("applying `{}` to {} arguments", procedure.name, args.len());
    procedure.apply(&args, expr.span)
}

fn evaluate_begin(operands: &[Expression], env: &mut Environment, span: Span) -> EvalResult {
    // An empty body yields the none value
    let mut result = Expression::none().with_span(span);
    for operand in operands {
        result = evaluate(operand, env)?;
    }
    Ok(result)
}

fn evaluate_define(operands: &[Expression], env: &mut Environment, span: Span) -> EvalResult {
    let [target, value] = operands else {
        return Err(EvalError::InvalidSpecialForm(
            format!(
                "define expects a symbol and a value, got {} operands",
                operands.len()
            ),
            span,
        ));
    };

    let name = match &target.head {
        Atom::Symbol(name) if target.is_leaf() => name,
        _ => return Err(EvalError::NotASymbol(target.clone(), target.span)),
    };

    let value = evaluate(value, env)?;
    env.define(name, value.clone(), span)?;
    Ok(value)
}

fn evaluate_if(operands: &[Expression], env: &mut Environment, span: Span) -> EvalResult {
    let [condition, consequent, alternate] = operands else {
        return Err(EvalError::InvalidSpecialForm(
            format!(
                "if expects a condition, a consequent and an alternate, got {} operands",
                operands.len()
            ),
            span,
        ));
    };

    // Only the chosen branch is evaluated
    match evaluate(condition, env)?.head {
        Atom::Boolean(true) => evaluate(consequent, env),
        Atom::Boolean(false) => evaluate(alternate, env),
        found => Err(EvalError::TypeMismatch {
            expected: "boolean",
            found,
            span: condition.span,
        }),
    }
}
