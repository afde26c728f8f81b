use std::{io, path::PathBuf};

use thiserror::Error;

use crate::syntax::token::Token;

/// A failure while executing a program. The token is the operator or
/// identifier the error is attributed to.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}\n[line {}]", .token.line)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: &Token, message: impl Into<String>) -> RuntimeError {
        RuntimeError {
            token: token.clone(),
            message: message.into(),
        }
    }
}

/// Host-level failures of the driver, outside the language pipeline.
#[derive(Debug, Error)]
pub enum SlexError {
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
