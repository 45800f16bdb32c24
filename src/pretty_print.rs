use crate::{EnvError, EvalError, ParseError};
use ariadne::{Label, Report, ReportKind, Source};
use std::io;
use std::ops::Range;

type SourceSpan<'a> = (&'a str, Range<usize>);

fn report<'a>(
    name: &'a str,
    range: Range<usize>,
    message: impl ToString,
    label: impl ToString,
) -> Report<'a, SourceSpan<'a>> {
    Report::build(ReportKind::Error, (name, range.clone()))
        .with_message(message)
        .with_label(Label::new((name, range)).with_message(label))
        .finish()
}

impl EvalError {
    /// Renders the error to stderr against the program text it came from.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        let range = self.span().map_or(0..0, |span| span.to_range());
        let report = match self {
            EvalError::EnvError(EnvError::UnboundSymbol(symbol, _)) => report(
                name,
                range,
                format!("Unbound symbol `{}`", symbol),
                "This symbol is not defined",
            ),
            EvalError::EnvError(EnvError::AlreadyDefined(symbol, _)) => report(
                name,
                range,
                format!("Symbol `{}` is already defined", symbol),
                "Definitions cannot be changed once made",
            ),
            EvalError::InvalidArguments(message, _) => {
                report(name, range, "Invalid arguments", message)
            }
            EvalError::NotASymbol(expr, _) => report(
                name,
                range,
                format!("Not a symbol: {}", expr),
                format!("Expected a symbol but found a {}", expr.head.type_name()),
            ),
            EvalError::InvalidSpecialForm(message, _) => report(
                name,
                range,
                format!("Invalid special form: {}", message),
                "This special form is malformed",
            ),
            EvalError::TypeMismatch {
                expected, found, ..
            } => report(
                name,
                range,
                "Type mismatch",
                format!("Expected {}, found {}", expected, found.type_name()),
            ),
            EvalError::NoProgram => report(
                name,
                range,
                "Nothing to evaluate",
                "No program has been parsed",
            ),
        };
        report.eprint((name, Source::from(input)))
    }
}

impl ParseError {
    /// Renders the error to stderr against the program text it came from.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        let report = match self {
            ParseError::UnexpectedToken { found, expected } => report(
                name,
                found.span.to_range(),
                format!("Unexpected token: {}", found.kind),
                format!("Expected {expected}"),
            ),
            ParseError::UnexpectedEof { expected } => {
                let end = input.len();
                report(
                    name,
                    end..end,
                    "Unexpected end of input",
                    format!("Expected {expected}"),
                )
            }
            ParseError::InvalidAtom { token, span } => report(
                name,
                span.to_range(),
                format!("Invalid atom `{}`", token),
                "Not a boolean, number, symbol or keyword",
            ),
            ParseError::EmptyApplication(span) => report(
                name,
                span.to_range(),
                "Empty application",
                "An application needs a head",
            ),
            ParseError::TooDeep { limit, span } => report(
                name,
                span.to_range(),
                "Expression nested too deeply",
                format!("Nesting exceeds {} levels here", limit),
            ),
        };
        report.eprint((name, Source::from(input)))
    }
}
