use crate::Span;
use crate::lexer::{Token, TokenKind};
use crate::types::{Atom, Expression};
use std::vec::IntoIter; // To iterate over Vec<Token>
use thiserror::Error;

/// Nesting limit used when no explicit one is configured.
pub const DEFAULT_MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Parse Error: Unexpected end of input during parsing. Expected {expected}")]
    UnexpectedEof { expected: String },
    #[error("Parse Error [at {}]: Unexpected token '{}', expected {expected}", .found.span, .found.kind)]
    UnexpectedToken { found: Token, expected: String },
    #[error("Parse Error [at {span}]: Invalid atom '{token}'")]
    InvalidAtom { token: String, span: Span },
    #[error("Parse Error [at {0}]: Empty application '()'")]
    EmptyApplication(Span),
    #[error("Parse Error [at {span}]: Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize, span: Span },
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: IntoIter<Token>,
    max_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser::with_max_depth(tokens, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(tokens: Vec<Token>, max_depth: usize) -> Self {
        Parser {
            tokens: tokens.into_iter(),
            max_depth,
        }
    }

    // The single place that detects running off the end of the token stream.
    fn next_token(&mut self, expected: &str) -> ParseResult<Token> {
        self.tokens.next().ok_or_else(|| ParseError::UnexpectedEof {
            expected: expected.to_string(),
        })
    }

    /// Parses a single expression from the token stream.
    pub fn parse_expr(&mut self) -> ParseResult<Expression> {
        let token = self.next_token("an atom or '('")?;
        self.parse_expr_with_token(token, 0)
    }

    fn parse_expr_with_token(&mut self, token: Token, depth: usize) -> ParseResult<Expression> {
        match token.kind {
            TokenKind::LParen => self.parse_application(token.span, depth + 1),
            _ => {
                let span = token.span;
                Ok(Expression::leaf(Self::parse_atom(token)?, span))
            }
        }
    }

    /// Classifies a token as an atom, failing on structural or malformed tokens.
    fn parse_atom(token: Token) -> ParseResult<Atom> {
        Atom::classify(token.text()).ok_or_else(|| ParseError::InvalidAtom {
            token: token.text().to_string(),
            span: token.span,
        })
    }

    /// Parses the rest of an application after its opening `(`.
    fn parse_application(&mut self, open: Span, depth: usize) -> ParseResult<Expression> {
        if depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                span: open,
            });
        }

        let head_token = self.next_token("an application head")?;
        if head_token.kind == TokenKind::RParen {
            return Err(ParseError::EmptyApplication(open.merge(head_token.span)));
        }
        let head = Self::parse_atom(head_token)?;

        let mut tail = Vec::new();
        loop {
            let token = self.next_token("')'")?;
            if token.kind == TokenKind::RParen {
                return Ok(Expression::new(head, tail, open.merge(token.span)));
            }
            tail.push(self.parse_expr_with_token(token, depth)?);
        }
    }

    /// Parses exactly one top-level expression covering all of the tokens.
    pub fn parse(mut self) -> ParseResult<Expression> {
        let expr = self.parse_expr()?;

        // Anything left over means the input was not a single balanced form
        if let Some(found) = self.tokens.next() {
            Err(ParseError::UnexpectedToken {
                found,
                expected: "end of input".to_string(),
            })
        } else {
            Ok(expr)
        }
    }
}

// Helper function to lex and parse a string directly (useful for tests and tools)
pub fn parse_str(input: &str) -> ParseResult<Expression> {
    Parser::new(crate::lexer::tokenize(input)).parse()
}
