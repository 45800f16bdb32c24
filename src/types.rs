use crate::source::Span;
use std::fmt; // For custom display formatting

/// The closed set of special-form keywords.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Keyword {
    Begin,
    Define,
    If,
}

impl Keyword {
    pub const ALL: [Keyword; 3] = [Keyword::Begin, Keyword::Define, Keyword::If];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Begin => "begin",
            Keyword::Define => "define",
            Keyword::If => "if",
        }
    }

    pub fn from_name(name: &str) -> Option<Keyword> {
        Keyword::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The smallest classified unit of syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    None,
    Boolean(bool),
    Number(f64),
    Symbol(String),
    Keyword(Keyword),
}

impl Atom {
    /// Classifies a single token, or returns `None` if the token is not a valid atom.
    ///
    /// Keywords win over symbols, and numbers are tried before symbols so that
    /// `-5` is a number. Numerals that overflow to infinity are rejected.
    pub fn classify(token: &str) -> Option<Atom> {
        if let Some(keyword) = Keyword::from_name(token) {
            return Some(Atom::Keyword(keyword));
        }
        match token {
            "(" | ")" => return None,
            "True" => return Some(Atom::Boolean(true)),
            "False" => return Some(Atom::Boolean(false)),
            _ => {}
        }
        if let Ok(n) = token.parse::<f64>() {
            if n.is_finite() {
                return Some(Atom::Number(n));
            }
            // `inf`, `NaN` and friends read as names; anything else is overflow.
            if !is_special_float_name(token) {
                return None;
            }
        }
        if is_symbol(token) {
            Some(Atom::Symbol(token.to_string()))
        } else {
            None
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::None => "none",
            Atom::Boolean(_) => "boolean",
            Atom::Number(_) => "number",
            Atom::Symbol(_) => "symbol",
            Atom::Keyword(_) => "keyword",
        }
    }
}

fn is_special_float_name(token: &str) -> bool {
    let unsigned = token.trim_start_matches(['+', '-']);
    ["inf", "infinity", "nan"]
        .iter()
        .any(|name| unsigned.eq_ignore_ascii_case(name))
}

fn is_symbol(token: &str) -> bool {
    match token.chars().next() {
        Some(first) => !first.is_ascii_digit() && !token.chars().any(char::is_whitespace),
        None => false,
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::None => write!(f, "()"),
            Atom::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Atom::Number(n) => write!(f, "{}", n),
            Atom::Symbol(s) => write!(f, "{}", s),
            Atom::Keyword(k) => write!(f, "{}", k),
        }
    }
}

/// An S-expression tree node: a head atom plus its ordered children.
///
/// Equality is deep and structural; spans are ignored.
#[derive(Debug, Clone)]
pub struct Expression {
    pub head: Atom,
    pub tail: Vec<Expression>,
    pub span: Span, // The source span it covers
}

impl Expression {
    pub fn new(head: Atom, tail: Vec<Expression>, span: Span) -> Self {
        Expression { head, tail, span }
    }

    pub fn leaf(head: Atom, span: Span) -> Self {
        Expression::new(head, Vec::new(), span)
    }

    pub fn none() -> Self {
        Expression::leaf(Atom::None, Span::default())
    }

    pub fn number(n: f64) -> Self {
        Expression::leaf(Atom::Number(n), Span::default())
    }

    pub fn boolean(b: bool) -> Self {
        Expression::leaf(Atom::Boolean(b), Span::default())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::leaf(Atom::Symbol(name.into()), Span::default())
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.tail.is_empty()
    }
}

impl Default for Expression {
    fn default() -> Self {
        Expression::none()
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.tail == other.tail
    }
}

impl From<f64> for Expression {
    fn from(n: f64) -> Self {
        Expression::number(n)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        Expression::boolean(b)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tail.is_empty() {
            return write!(f, "{}", self.head);
        }
        write!(f, "({}", self.head)?;
        for child in &self.tail {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}
