use crate::evaluator::EvalResult;
use crate::source::Span;
use crate::types::{Atom, Expression};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

// --- Environment Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvError {
    #[error("Unbound symbol: '{0}'")]
    UnboundSymbol(String, Span), // Symbol name, span where lookup happened
    #[error("Symbol '{0}' is already defined")]
    AlreadyDefined(String, Span), // Symbol name, span of the offending define
}

/// Signature shared by all built-in procedures: evaluated arguments and the
/// span of the call, for error reporting.
pub type PrimitiveFunc = fn(&[Atom], Span) -> EvalResult;

#[derive(Clone, Copy)]
pub struct Primitive {
    pub name: &'static str,
    pub func: PrimitiveFunc,
}

impl Primitive {
    pub fn apply(&self, args: &[Atom], span: Span) -> EvalResult {
        (self.func)(args, span)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

// Function pointers don't compare reliably, so primitives compare by name.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// What a symbol is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(Expression),
    Procedure(Primitive),
}

// --- Environment Definition ---

/// A session's symbol table. Bindings are write-once: the first definition
/// of a name wins and later definitions are rejected.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Binding>,
}

impl Environment {
    /// Creates a new, empty environment.
    pub fn new() -> Self {
        Environment {
            bindings: HashMap::new(),
        }
    }

    /// Creates an environment pre-seeded with the built-in procedures and constants.
    pub fn new_global_populated() -> Self {
        use crate::primitives::*;

        let mut env = Environment::new();
        env.add_primitive("not", prim_not);
        env.add_primitive("and", prim_and);
        env.add_primitive("or", prim_or);

        env.add_primitive("=", prim_equals);
        env.add_primitive("<", prim_less_than);
        env.add_primitive("<=", prim_less_than_or_equals);
        env.add_primitive(">", prim_greater_than);
        env.add_primitive(">=", prim_greater_than_or_equals);

        env.add_primitive("+", prim_add);
        env.add_primitive("-", prim_sub);
        env.add_primitive("*", prim_mul);
        env.add_primitive("/", prim_div);
        env.add_primitive("log10", prim_log10);
        env.add_primitive("pow", prim_pow);

        env.bindings.insert(
            "pi".to_string(),
            Binding::Value(Expression::number(std::f64::consts::PI)),
        );
        env
    }

    /// Looks up a symbol. Absence is not an error here.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Looks up a symbol, reporting an unbound symbol at `lookup_span`.
    pub fn get(&self, name: &str, lookup_span: Span) -> Result<&Binding, EnvError> {
        self.lookup(name)
            .ok_or_else(|| EnvError::UnboundSymbol(name.to_string(), lookup_span))
    }

    /// Binds `name` to `value`, failing if the name is already bound.
    pub fn define(&mut self, name: &str, value: Expression, span: Span) -> Result<(), EnvError> {
        if self.bindings.contains_key(name) {
            return Err(EnvError::AlreadyDefined(name.to_string(), span));
        }
        self.bindings.insert(name.to_string(), Binding::Value(value));
        Ok(())
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Helper to add a primitive procedure to the environment.
    fn add_primitive(&mut self, name: &'static str, func: PrimitiveFunc) {
        self.bindings
            .insert(name.to_string(), Binding::Procedure(Primitive { name, func }));
    }

    /// Gets all identifiers bound in the environment
    pub fn identifiers(&self) -> HashSet<String> {
        self.bindings.keys().cloned().collect()
    }
}
