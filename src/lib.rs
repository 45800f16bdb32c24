//! A minimal S-expression interpreter: text is tokenized, parsed into an
//! [`Expression`] tree and evaluated against a write-once [`Environment`] of
//! built-in procedures and user definitions.
//!
//! ```
//! use slisp::Interpreter;
//!
//! let mut interp = Interpreter::new();
//! interp.parse("(begin (define r 2) (* r r))").unwrap();
//! assert_eq!(interp.eval().unwrap().to_string(), "4");
//! ```

// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod primitives;
pub mod source;
pub mod types;

pub use environment::{Binding, EnvError, Environment, Primitive};
pub use evaluator::{EvalError, EvalResult, evaluate};
pub use interpreter::{Config, Error, Interpreter};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{ParseError, Parser, parse_str};
pub use source::Span;
pub use types::{Atom, Expression, Keyword};
