use crate::environment::Environment;
use crate::evaluator::{EvalError, EvalResult, evaluate};
use crate::lexer::tokenize;
use crate::parser::{DEFAULT_MAX_DEPTH, ParseError, Parser};
use crate::types::Expression;
use log::debug;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Deepest parenthesis nesting the parser accepts. Parsing and evaluation
    /// both recurse once per level, so this bounds stack use.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// One interpreter session: an environment that accumulates definitions and
/// the most recently parsed program.
///
/// A session is single threaded. Separate sessions share nothing.
#[derive(Debug, Clone)]
pub struct Interpreter {
    config: Config,
    env: Environment,
    ast: Option<Expression>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter {
            config,
            env: Environment::new_global_populated(),
            ast: None,
        }
    }

    /// Parses `text` into the program evaluated by the next [`Interpreter::eval`].
    ///
    /// On failure the previously parsed program, if any, is kept.
    pub fn parse(&mut self, text: &str) -> Result<(), ParseError> {
        let tokens = tokenize(text);
        debug!("parsing {} tokens", tokens.len());
        let expr = Parser::with_max_depth(tokens, self.config.max_depth).parse()?;
        debug!("parsed program: {}", expr);
        self.ast = Some(expr);
        Ok(())
    }

    /// Evaluates the most recently parsed program against the session environment.
    pub fn eval(&mut self) -> EvalResult {
        let ast = self.ast.as_ref().ok_or(EvalError::NoProgram)?;
        debug!("evaluating: {}", ast);
        evaluate(ast, &mut self.env)
    }

    /// Parses and evaluates `text` in one step.
    pub fn run(&mut self, text: &str) -> Result<Expression, Error> {
        self.parse(text)?;
        Ok(self.eval()?)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Binding, EnvError};
    use crate::source::Span;

    fn run_ok(interp: &mut Interpreter, input: &str) -> Expression {
        match interp.run(input) {
            Ok(result) => result,
            Err(e) => panic!("Running '{}' failed: {}", input, e),
        }
    }

    fn assert_run(input: &str, expected: Expression) {
        assert_eq!(run_ok(&mut Interpreter::new(), input), expected, "Input: '{}'", input);
    }

    fn assert_eval_fails(interp: &mut Interpreter, input: &str) {
        assert!(interp.parse(input).is_ok(), "Parsing failed for '{}'", input);
        assert!(interp.eval().is_err(), "Expected '{}' to fail evaluation", input);
    }

    #[test]
    fn test_literal_round_trip() {
        for literal in ["5", "-0.25", "1e-7", "True", "False", "123456789"] {
            let mut interp = Interpreter::new();
            let first = run_ok(&mut interp, literal);
            let again = run_ok(&mut interp, &first.to_string());
            assert_eq!(first, again, "Literal: '{}'", literal);
        }
    }

    #[test]
    fn test_define_is_write_once_across_cycles() {
        let mut interp = Interpreter::new();
        assert_eq!(run_ok(&mut interp, "(define x 1)"), Expression::number(1.0));
        assert!(matches!(
            interp.run("(define x 2)"),
            Err(Error::Eval(EvalError::EnvError(EnvError::AlreadyDefined(name, _)))) if name == "x"
        ));
        assert_eq!(run_ok(&mut interp, "x"), Expression::number(1.0));
    }

    #[test]
    fn test_if_short_circuits() {
        let mut interp = Interpreter::new();
        assert_eq!(run_ok(&mut interp, "(if True 1 (define x 2))"), Expression::number(1.0));
        assert!(!interp.environment().is_defined("x"));
    }

    #[test]
    fn test_arity_boundaries() {
        assert_run("(+)", Expression::number(0.0));
        assert_run("(*)", Expression::number(1.0));
        assert_run("(and)", Expression::boolean(true));
        assert_run("(or)", Expression::boolean(false));
        assert_run("(- 5)", Expression::number(-5.0));
        assert_run("(- 5 3)", Expression::number(2.0));

        let mut interp = Interpreter::new();
        assert_eval_fails(&mut interp, "(- )");
        assert_eval_fails(&mut interp, "(- 1 2 3)");
    }

    #[test]
    fn test_type_boundaries() {
        let mut interp = Interpreter::new();
        assert_eval_fails(&mut interp, "(not 1)");
        assert_eval_fails(&mut interp, "(< True 2)");
    }

    #[test]
    fn test_unbound_then_defined() {
        let mut interp = Interpreter::new();
        assert!(matches!(
            interp.run("y"),
            Err(Error::Eval(EvalError::EnvError(EnvError::UnboundSymbol(name, _)))) if name == "y"
        ));
        run_ok(&mut interp, "(define y 10)");
        assert_eq!(run_ok(&mut interp, "y"), Expression::number(10.0));
    }

    #[test]
    fn test_structural_parse_failures() {
        let mut interp = Interpreter::new();
        assert!(interp.parse("()").is_err());
        assert!(interp.parse("(+ 1").is_err());
        assert!(interp.parse("(+ 1))").is_err());
    }

    #[test]
    fn test_eval_without_program() {
        let mut interp = Interpreter::new();
        assert_eq!(interp.eval(), Err(EvalError::NoProgram));
        assert!(interp.parse("(+ 1").is_err());
        assert_eq!(interp.eval(), Err(EvalError::NoProgram));
    }

    #[test]
    fn test_failed_parse_keeps_previous_program() {
        let mut interp = Interpreter::new();
        interp.parse("(+ 1 2)").unwrap();
        assert!(interp.parse("(+ 1").is_err());
        assert_eq!(interp.eval(), Ok(Expression::number(3.0)));
    }

    #[test]
    fn test_semantic_error_is_not_fatal_to_session() {
        let mut interp = Interpreter::new();
        run_ok(&mut interp, "(define a 2)");
        assert!(interp.run("(+ a True)").is_err());
        assert_eq!(run_ok(&mut interp, "(* a a)"), Expression::number(4.0));
        assert!(matches!(
            interp.environment().lookup("a"),
            Some(Binding::Value(value)) if *value == Expression::number(2.0)
        ));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = Interpreter::new();
        let mut second = Interpreter::new();
        run_ok(&mut first, "(define shared 1)");
        assert!(second.run("shared").is_err());
        assert_eq!(run_ok(&mut second, "(define shared 2)"), Expression::number(2.0));
    }

    #[test]
    fn test_max_depth_config() {
        let mut interp = Interpreter::with_config(Config { max_depth: 2 });
        assert_eq!(interp.config().max_depth, 2);
        assert_eq!(run_ok(&mut interp, "(+ 1 (+ 2 3))"), Expression::number(6.0));
        assert!(matches!(
            interp.run("(+ 1 (+ 2 (+ 3 4)))"),
            Err(Error::Parse(ParseError::TooDeep { limit: 2, span })) if span == Span::new(10, 11)
        ));
    }

    #[test]
    fn test_program_circle_area() {
        let mut interp = Interpreter::new();
        let result = run_ok(&mut interp, "(begin (define r 10) (* pi (pow r 2)))");
        assert_eq!(result, Expression::number(std::f64::consts::PI * 100.0));
        assert_eq!(result.to_string(), (std::f64::consts::PI * 100.0).to_string());
    }
}
