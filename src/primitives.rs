use crate::evaluator::{EvalError, EvalResult};
use crate::source::Span;
use crate::types::{Atom, Expression};

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr, $span:expr, $name:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::InvalidArguments(
                format!(
                    "Primitive '{}' expects exactly {} arguments, got {}",
                    $name,
                    $expected,
                    $args.len()
                ),
                $span,
            ));
        }
    };
    // Variant for range of args (inclusive)
    ($args:expr, $min:expr, $max:expr, $span:expr, $name:expr) => {
        if !($min..=$max).contains(&$args.len()) {
            return Err(EvalError::InvalidArguments(
                format!(
                    "Primitive '{}' expects between {} and {} arguments, got {}",
                    $name,
                    $min,
                    $max,
                    $args.len()
                ),
                $span,
            ));
        }
    };
}

// Extracts a number from an Atom or returns an InvalidArguments error
macro_rules! expect_number {
    ($atom:expr, $span:expr, $name:expr, $arg_pos:expr) => {
        match $atom {
            Atom::Number(n) => *n,
            other => {
                return Err(EvalError::InvalidArguments(
                    format!(
                        "Primitive '{}' expects a number for argument {}, got {}",
                        $name,
                        $arg_pos,
                        other.type_name()
                    ),
                    $span,
                ));
            }
        }
    };
}

macro_rules! expect_boolean {
    ($atom:expr, $span:expr, $name:expr, $arg_pos:expr) => {
        match $atom {
            Atom::Boolean(b) => *b,
            other => {
                return Err(EvalError::InvalidArguments(
                    format!(
                        "Primitive '{}' expects a boolean for argument {}, got {}",
                        $name,
                        $arg_pos,
                        other.type_name()
                    ),
                    $span,
                ));
            }
        }
    };
}

fn number(n: f64, span: Span) -> EvalResult {
    Ok(Expression::number(n).with_span(span))
}

fn boolean(b: bool, span: Span) -> EvalResult {
    Ok(Expression::boolean(b).with_span(span))
}

// --- Logic ---

pub fn prim_not(args: &[Atom], span: Span) -> EvalResult {
    check_arity!(args, 1, span, "not");
    let value = expect_boolean!(&args[0], span, "not", 1);
    boolean(!value, span)
}

fn fold_booleans<F: Fn(bool, bool) -> bool>(
    args: &[Atom],
    span: Span,
    start: bool,
    func: F,
    operator: &str,
) -> EvalResult {
    let mut acc = start;
    // Every argument is type checked, so no early exit
    for (i, atom) in args.iter().enumerate() {
        let value = expect_boolean!(atom, span, operator, i + 1);
        acc = func(acc, value);
    }
    boolean(acc, span)
}

pub fn prim_and(args: &[Atom], span: Span) -> EvalResult {
    // (and) -> True
    fold_booleans(args, span, true, |acc, val| acc && val, "and")
}

pub fn prim_or(args: &[Atom], span: Span) -> EvalResult {
    // (or) -> False
    fold_booleans(args, span, false, |acc, val| acc || val, "or")
}

// --- Comparison ---

fn compare_numbers<F: Fn(f64, f64) -> bool>(
    args: &[Atom],
    span: Span,
    compare: F,
    operator: &str,
) -> EvalResult {
    check_arity!(args, 2, span, operator);
    let left = expect_number!(&args[0], span, operator, 1);
    let right = expect_number!(&args[1], span, operator, 2);
    boolean(compare(left, right), span)
}

pub fn prim_equals(args: &[Atom], span: Span) -> EvalResult {
    compare_numbers(args, span, |left, right| left == right, "=")
}

pub fn prim_less_than(args: &[Atom], span: Span) -> EvalResult {
    compare_numbers(args, span, |left, right| left < right, "<")
}

pub fn prim_less_than_or_equals(args: &[Atom], span: Span) -> EvalResult {
    compare_numbers(args, span, |left, right| left <= right, "<=")
}

pub fn prim_greater_than(args: &[Atom], span: Span) -> EvalResult {
    compare_numbers(args, span, |left, right| left > right, ">")
}

pub fn prim_greater_than_or_equals(args: &[Atom], span: Span) -> EvalResult {
    compare_numbers(args, span, |left, right| left >= right, ">=")
}

// --- Arithmetic ---

fn fold_numbers<F: Fn(f64, f64) -> f64>(
    args: &[Atom],
    span: Span,
    start: f64,
    func: F,
    operator: &str,
) -> EvalResult {
    let mut acc = start;
    for (i, atom) in args.iter().enumerate() {
        let num = expect_number!(atom, span, operator, i + 1);
        acc = func(acc, num);
    }
    number(acc, span)
}

pub fn prim_add(args: &[Atom], span: Span) -> EvalResult {
    // (+) -> 0
    // (+ 1 2 3) -> 6
    fold_numbers(args, span, 0.0, |acc, val| acc + val, "+")
}

pub fn prim_sub(args: &[Atom], span: Span) -> EvalResult {
    // (- x) -> -x
    // (- x y) -> x - y
    check_arity!(args, 1, 2, span, "-");
    let first = expect_number!(&args[0], span, "-", 1);
    match args.get(1) {
        Some(atom) => {
            let second = expect_number!(atom, span, "-", 2);
            number(first - second, span)
        }
        None => number(-first, span),
    }
}

pub fn prim_mul(args: &[Atom], span: Span) -> EvalResult {
    // (*) -> 1
    // (* 1 2 3) -> 6
    fold_numbers(args, span, 1.0, |acc, val| acc * val, "*")
}

fn binary_numbers<F: Fn(f64, f64) -> f64>(
    args: &[Atom],
    span: Span,
    func: F,
    operator: &str,
) -> EvalResult {
    check_arity!(args, 2, span, operator);
    let left = expect_number!(&args[0], span, operator, 1);
    let right = expect_number!(&args[1], span, operator, 2);
    number(func(left, right), span)
}

pub fn prim_div(args: &[Atom], span: Span) -> EvalResult {
    // Division by zero follows IEEE semantics: inf or NaN.
    binary_numbers(args, span, |left, right| left / right, "/")
}

pub fn prim_pow(args: &[Atom], span: Span) -> EvalResult {
    binary_numbers(args, span, f64::powf, "pow")
}

pub fn prim_log10(args: &[Atom], span: Span) -> EvalResult {
    check_arity!(args, 1, span, "log10");
    let value = expect_number!(&args[0], span, "log10", 1);
    number(value.log10(), span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PrimitiveFunc;

    fn nums(values: &[f64]) -> Vec<Atom> {
        values.iter().map(|n| Atom::Number(*n)).collect()
    }

    fn bools(values: &[bool]) -> Vec<Atom> {
        values.iter().map(|b| Atom::Boolean(*b)).collect()
    }

    fn assert_prim(func: PrimitiveFunc, args: &[Atom], expected: Expression) {
        match func(args, Span::default()) {
            Ok(result) => assert_eq!(result, expected, "Args: {:?}", args),
            Err(e) => panic!("Primitive failed for args {:?}: {}", args, e),
        }
    }

    fn assert_prim_error(func: PrimitiveFunc, args: &[Atom]) {
        assert!(
            matches!(
                func(args, Span::default()),
                Err(EvalError::InvalidArguments(_, _))
            ),
            "Expected InvalidArguments for args {:?}",
            args
        );
    }

    #[test]
    fn test_logic() {
        assert_prim(prim_not, &bools(&[true]), Expression::boolean(false));
        assert_prim(prim_not, &bools(&[false]), Expression::boolean(true));
        assert_prim(prim_and, &[], Expression::boolean(true));
        assert_prim(prim_and, &bools(&[true, true]), Expression::boolean(true));
        assert_prim(prim_and, &bools(&[true, false]), Expression::boolean(false));
        assert_prim(prim_or, &[], Expression::boolean(false));
        assert_prim(prim_or, &bools(&[false, true]), Expression::boolean(true));
        assert_prim(prim_or, &bools(&[false, false]), Expression::boolean(false));
    }

    #[test]
    fn test_logic_errors() {
        assert_prim_error(prim_not, &[]);
        assert_prim_error(prim_not, &bools(&[true, false]));
        assert_prim_error(prim_not, &nums(&[1.0]));
        // No short circuit past a bad argument
        assert_prim_error(prim_and, &[Atom::Boolean(false), Atom::Number(1.0)]);
        assert_prim_error(prim_or, &[Atom::Boolean(true), Atom::None]);
    }

    #[test]
    fn test_comparisons() {
        assert_prim(prim_equals, &nums(&[5.0, 5.0]), Expression::boolean(true));
        assert_prim(prim_equals, &nums(&[5.0, 6.0]), Expression::boolean(false));
        assert_prim(prim_less_than, &nums(&[4.0, 5.0]), Expression::boolean(true));
        assert_prim(prim_less_than, &nums(&[5.0, 5.0]), Expression::boolean(false));
        assert_prim(prim_less_than_or_equals, &nums(&[5.0, 5.0]), Expression::boolean(true));
        assert_prim(prim_greater_than, &nums(&[6.0, 5.0]), Expression::boolean(true));
        assert_prim(prim_greater_than_or_equals, &nums(&[4.0, 5.0]), Expression::boolean(false));
    }

    #[test]
    fn test_comparison_errors() {
        assert_prim_error(prim_less_than, &nums(&[1.0]));
        assert_prim_error(prim_less_than, &nums(&[1.0, 2.0, 3.0]));
        assert_prim_error(prim_less_than, &[Atom::Boolean(true), Atom::Number(2.0)]);
        assert_prim_error(prim_equals, &[]);
    }

    #[test]
    fn test_arithmetic() {
        assert_prim(prim_add, &[], Expression::number(0.0));
        assert_prim(prim_add, &nums(&[1.0, 2.0, 3.0]), Expression::number(6.0));
        assert_prim(prim_mul, &[], Expression::number(1.0));
        assert_prim(prim_mul, &nums(&[2.0, 3.0, 4.0]), Expression::number(24.0));
        assert_prim(prim_sub, &nums(&[5.0]), Expression::number(-5.0));
        assert_prim(prim_sub, &nums(&[5.0, 3.0]), Expression::number(2.0));
        assert_prim(prim_div, &nums(&[10.0, 4.0]), Expression::number(2.5));
        assert_prim(prim_pow, &nums(&[2.0, 10.0]), Expression::number(1024.0));
        assert_prim(prim_log10, &nums(&[10.0]), Expression::number(1.0));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        assert_prim(prim_div, &nums(&[1.0, 0.0]), Expression::number(f64::INFINITY));
        let nan = prim_div(&nums(&[0.0, 0.0]), Span::default()).unwrap();
        assert!(matches!(nan.head, Atom::Number(n) if n.is_nan()));
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_prim_error(prim_sub, &[]);
        assert_prim_error(prim_sub, &nums(&[1.0, 2.0, 3.0]));
        assert_prim_error(prim_add, &[Atom::Number(1.0), Atom::Boolean(true)]);
        assert_prim_error(prim_mul, &[Atom::Symbol("x".to_string())]);
        assert_prim_error(prim_div, &nums(&[1.0]));
        assert_prim_error(prim_div, &nums(&[1.0, 2.0, 3.0]));
        assert_prim_error(prim_log10, &[]);
        assert_prim_error(prim_log10, &[Atom::Boolean(false)]);
        assert_prim_error(prim_pow, &nums(&[2.0]));
    }

    #[test]
    fn test_error_message_names_argument() {
        match prim_add(&[Atom::Number(1.0), Atom::Boolean(true)], Span::new(0, 9)) {
            Err(EvalError::InvalidArguments(msg, span)) => {
                assert_eq!(
                    msg,
                    "Primitive '+' expects a number for argument 2, got boolean"
                );
                assert_eq!(span, Span::new(0, 9));
            }
            other => panic!("Expected InvalidArguments, got {:?}", other),
        }
    }
}
