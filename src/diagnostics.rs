use std::fmt;

use tracing::debug;

use crate::{
    error::RuntimeError,
    syntax::token::{Token, TokenType},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Runtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            // `[line n]` rather than a bare `[n]`, to match compile-time reports
            DiagnosticKind::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
            _ => write!(
                f,
                "[line {}] Error{}: {}",
                self.line, self.location, self.message
            ),
        }
    }
}

/// Error state for one run of the pipeline.
///
/// Owned by the caller and lent to the scanner, parser and interpreter in
/// turn. Every report is written to stderr as it arrives and kept so the
/// caller can inspect it afterwards.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
    reports: Vec<Diagnostic>,
    quiet: bool,
}

impl Diagnostics {
    pub fn new() -> Diagnostics {
        Diagnostics::default()
    }

    /// Collects reports without writing them to stderr.
    pub fn quiet() -> Diagnostics {
        Diagnostics {
            quiet: true,
            ..Diagnostics::default()
        }
    }

    /// Reports a lexical error with no token to anchor it.
    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.report(DiagnosticKind::Lexical, line, String::new(), message.into());
    }

    /// Reports a syntax error anchored to the offending token.
    pub fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        let location = match token.token_type {
            TokenType::Eof => String::from(" at end"),
            _ => format!(" at '{}'", token.lexeme),
        };
        self.report(DiagnosticKind::Syntax, token.line, location, message.into());
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        self.had_runtime_error = true;
        self.push(Diagnostic {
            kind: DiagnosticKind::Runtime,
            line: error.token.line,
            location: String::new(),
            message: error.message.clone(),
        });
    }

    /// True when a lexical or syntax error has been reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reports(&self) -> &[Diagnostic] {
        &self.reports
    }

    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
        self.reports.clear();
    }

    fn report(&mut self, kind: DiagnosticKind, line: usize, location: String, message: String) {
        self.had_error = true;
        self.push(Diagnostic {
            kind,
            line,
            location,
            message,
        });
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        debug!(kind = ?diagnostic.kind, line = diagnostic.line, "diagnostic reported");
        if !self.quiet {
            eprintln!("{diagnostic}");
        }
        self.reports.push(diagnostic);
    }
}
