pub mod cli;
pub use cli::{Command, CompilerOptions, EmitKind};

use crate::errors::CompileError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error(transparent)]
    InputSourceError(#[from] io::Error),

    #[error(transparent)]
    CompileError(#[from] CompileError),

    #[error("can't serialize output: {0}")]
    OutputError(#[from] serde_json::Error),
}

impl From<String> for CompilerError {
    fn from(message: String) -> Self {
        CompilerError::InvalidOption(message)
    }
}
