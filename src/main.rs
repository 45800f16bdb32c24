use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use slisp::{Config, Error, Interpreter};

/// Run a single slisp program and print its result.
#[derive(Parser, Debug)]
#[command(name = "slisp", version)]
struct Cli {
    /// Program file to run; `-` or absent reads stdin
    file: Option<PathBuf>,

    /// Program text given directly on the command line
    #[arg(short, long, conflicts_with = "file")]
    expr: Option<String>,

    /// Deepest parenthesis nesting accepted
    #[arg(long, default_value_t = Config::default().max_depth)]
    max_depth: usize,
}

fn read_program(cli: &Cli) -> io::Result<(String, String)> {
    if let Some(expr) = &cli.expr {
        return Ok(("<expr>".to_string(), expr.clone()));
    }
    match &cli.file {
        Some(path) if path.as_os_str() != "-" => {
            Ok((path.display().to_string(), fs::read_to_string(path)?))
        }
        _ => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            Ok(("<stdin>".to_string(), buffer))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (name, program) = match read_program(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Could not read program: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut interp = Interpreter::with_config(Config {
        max_depth: cli.max_depth,
    });
    let outcome = interp.run(&program);
    let rendered = match &outcome {
        Ok(result) => {
            println!("{}", result);
            return ExitCode::SUCCESS;
        }
        Err(Error::Parse(e)) => e.pretty_print(&name, &program),
        Err(Error::Eval(e)) => e.pretty_print(&name, &program),
    };
    if rendered.is_err() {
        // Fall back to the plain message if the report could not be written
        if let Err(e) = outcome {
            eprintln!("Error: {}", e);
        }
    }
    ExitCode::FAILURE
}
