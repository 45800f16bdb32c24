use std::borrow::Cow;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};
use slisp::evaluator::special_form_identifiers;
use slisp::{Config, Interpreter, TokenKind, tokenize};

/// Interactive slisp session.
#[derive(Parser, Debug)]
#[command(name = "slisp-repl", version)]
struct Cli {
    /// Use vi key bindings instead of emacs
    #[arg(long)]
    vi: bool,

    /// Where to load and save input history
    #[arg(long, default_value = "slisp_history.txt")]
    history: PathBuf,

    /// Deepest parenthesis nesting accepted
    #[arg(long, default_value_t = Config::default().max_depth)]
    max_depth: usize,
}

struct SlispCompleter {
    interp: Rc<RefCell<Interpreter>>,
}

impl rustyline::completion::Completer for SlispCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let prefix = match tokenize(&line[..pos]).pop() {
            Some(token) if line[..pos].ends_with(token.text()) => match token.kind {
                TokenKind::Atom(prefix) => prefix,
                _ => return Ok((pos, vec![])),
            },
            _ => return Ok((pos, vec![])),
        };
        let mut candidates: Vec<String> = self
            .interp
            .borrow()
            .environment()
            .identifiers()
            .union(&special_form_identifiers())
            .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
            .collect();
        candidates.sort();
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Validator)]
    validator: SlispValidator,
    #[rustyline(Highlighter)]
    highlighter: SlispHighlighter,
    #[rustyline(Completer)]
    completer: SlispCompleter,
}

struct SlispValidator;

impl Validator for SlispValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let mut depth = 0usize;
        for (i, c) in ctx.input().chars().enumerate() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    return Ok(ValidationResult::Invalid(Some(format!(
                        "  - Unmatched ')' at position {}",
                        i
                    ))));
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

struct SlispHighlighter;

impl Highlighter for SlispHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        // Open parens as (index in line, index in highlighted output)
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut highlighted = String::new();
        let cursor = pos.checked_sub(1);

        for (i, c) in line.char_indices() {
            match c {
                '(' => {
                    stack.push((i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' => match stack.pop() {
                    Some((opening, matching_pos)) if cursor == Some(i) || cursor == Some(opening) => {
                        highlighted.push_str("\x1b[34m)\x1b[0m"); // Blue for matching parens
                        highlighted.replace_range(matching_pos..=matching_pos, "\x1b[1;34m(\x1b[0m");
                    }
                    Some(_) => highlighted.push(c),
                    None => highlighted.push_str("\x1b[31m)\x1b[0m"), // Red for unmatched
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn main() -> rustyline::Result<()> {
    let cli = Cli::parse();

    println!("slisp REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");

    let interp = Rc::new(RefCell::new(Interpreter::with_config(Config {
        max_depth: cli.max_depth,
    })));
    let helper = ReplHelper {
        highlighter: SlispHighlighter,
        validator: SlispValidator,
        completer: SlispCompleter {
            interp: interp.clone(),
        },
    };
    let edit_mode = if cli.vi {
        rustyline::EditMode::Vi
    } else {
        rustyline::EditMode::Emacs
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode)
        .build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if rl.load_history(&cli.history).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("slisp> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input.eq_ignore_ascii_case("exit") {
                    break;
                }

                let mut session = interp.borrow_mut();
                if let Err(e) = session.parse(input) {
                    if e.pretty_print("REPL", input).is_err() {
                        eprintln!("{}", e);
                    }
                    continue;
                }
                match session.eval() {
                    Ok(result) => println!("{}", result),
                    Err(e) => {
                        if e.pretty_print("REPL", input).is_err() {
                            eprintln!("{}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(&cli.history)
}
