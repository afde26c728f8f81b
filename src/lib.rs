use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::{debug, info};

use ast_printer::AstPrinter;
use diagnostics::Diagnostics;
use error::SlexError;
use interpreter::Interpreter;
use parser::Parser;
use scanner::Scanner;
use syntax::{stmt::Stmt, token::TokenType};
use utils::logger::{Logger, StdoutLogger};

pub mod ast_printer;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod utils;
pub mod value;

pub use utils::logger;

/// Exit code for invalid command line usage.
pub const EX_USAGE: i32 = 64;
/// Exit code when the script file cannot be read.
pub const EX_NOINPUT: i32 = 66;

/// Outcome of running a whole script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    CompileError,
    RuntimeError,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::CompileError => 65,
            Status::RuntimeError => 70,
        }
    }
}

/// One interpreter session: a persistent global scope plus the diagnostics
/// of the most recent run.
pub struct Slex {
    interpreter: Interpreter,
    diagnostics: Diagnostics,
    dump_ast: bool,
}

impl Default for Slex {
    fn default() -> Self {
        Slex::new(Box::new(StdoutLogger))
    }
}

impl Slex {
    pub fn new(logger: Box<dyn Logger>) -> Slex {
        Slex {
            interpreter: Interpreter::with_logger(logger),
            diagnostics: Diagnostics::new(),
            dump_ast: false,
        }
    }

    /// Writes every parsed statement to stderr before it is interpreted.
    pub fn with_ast_dump(mut self, dump_ast: bool) -> Slex {
        self.dump_ast = dump_ast;
        self
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Scans, parses and interprets `source`. Nothing is executed when a
    /// lexical or syntax error was reported. Error state from the previous
    /// run is discarded first; globals are kept.
    pub fn run(&mut self, source: &str) -> Status {
        self.diagnostics.reset();

        let Some(statements) = self.compile(source) else {
            return Status::CompileError;
        };

        self.interpreter.interpret(&statements, &mut self.diagnostics);
        self.status()
    }

    /// Runs one line of interactive input. Error state from earlier lines
    /// is discarded first; a lone expression statement has its value echoed.
    pub fn run_line(&mut self, line: &str) -> Status {
        self.diagnostics.reset();

        // the `;` goes on its own line so a trailing comment cannot swallow it
        let source = if needs_semicolon(line) {
            format!("{line}\n;")
        } else {
            line.to_string()
        };

        let Some(statements) = self.compile(&source) else {
            return Status::CompileError;
        };

        match statements.as_slice() {
            [Stmt::Expression(expr)] => {
                if let Some(value) = self
                    .interpreter
                    .evaluate_expression(expr, &mut self.diagnostics)
                {
                    self.interpreter.echo(&value);
                }
            }
            _ => self.interpreter.interpret(&statements, &mut self.diagnostics),
        }
        self.status()
    }

    fn compile(&mut self, source: &str) -> Option<Vec<Stmt>> {
        let tokens = Scanner::new(source, &mut self.diagnostics).scan_tokens();
        let statements = Parser::new(&tokens, &mut self.diagnostics).parse();
        debug!(
            tokens = tokens.len(),
            statements = statements.len(),
            had_error = self.diagnostics.had_error(),
            "compiled source"
        );

        if self.dump_ast {
            let mut printer = AstPrinter;
            for statement in &statements {
                eprintln!("{}", printer.print_stmt(statement));
            }
        }

        if self.diagnostics.had_error() {
            return None;
        }
        Some(statements)
    }

    fn status(&self) -> Status {
        if self.diagnostics.had_error() {
            Status::CompileError
        } else if self.diagnostics.had_runtime_error() {
            Status::RuntimeError
        } else {
            Status::Success
        }
    }
}

/// True when the last token of `line` does not already close a statement.
fn needs_semicolon(line: &str) -> bool {
    // lexical errors are reported by the real scan that follows
    let mut lookahead = Diagnostics::quiet();
    let tokens = Scanner::new(line, &mut lookahead).scan_tokens();
    match tokens.iter().rev().nth(1) {
        Some(last) => !matches!(last.token_type, TokenType::Semicolon | TokenType::RightBrace),
        None => false,
    }
}

/// Runs the script at `path`. Program output goes to `logger`, or stdout
/// when none is given.
pub fn run_file(path: impl AsRef<Path>, logger: Option<Box<dyn Logger>>) -> Result<Status, SlexError> {
    let source = read_script(path)?;
    let mut slex = Slex::new(logger.unwrap_or_else(|| Box::new(StdoutLogger)));
    Ok(slex.run(&source))
}

pub fn read_script(path: impl AsRef<Path>) -> Result<String, SlexError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SlexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = source.len(), "read script");
    Ok(source)
}

/// Interactive session on stdin until EOF or `exit`.
pub fn run_prompt(dump_ast: bool) -> io::Result<()> {
    let mut slex = Slex::default().with_ast_dump(dump_ast);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut user_input = String::new();
        if input.read_line(&mut user_input)? == 0 {
            break;
        }

        let user_input = user_input.trim();
        if user_input == "exit" {
            break;
        }
        slex.run_line(user_input);
    }

    Ok(())
}
