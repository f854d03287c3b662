use crate::codegen::RenderError;
use crate::syntax::Position;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error(transparent)]
    Internal(#[from] InternalError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl CompileError {
    pub fn reference_error<S: Into<String>>(message: S) -> Self {
        CodeError::new(CodeErrorKind::Reference, message).into()
    }

    pub fn type_error<S: Into<String>>(message: S) -> Self {
        CodeError::new(CodeErrorKind::Type, message).into()
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        InternalError::new(message).into()
    }

    /// Attaches `position` to a user code error which doesn't have one yet.
    /// Other errors are returned untouched.
    pub fn or_position(self, position: &Position) -> Self {
        match self {
            CompileError::Code(err) => CompileError::Code(err.or_position(position)),
            err => err,
        }
    }

    pub fn code_error(&self) -> Option<&CodeError> {
        if let CompileError::Code(err) = self {
            Some(err)
        } else {
            None
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_))
    }
}

/// An error in the program being compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct CodeError {
    pub kind: CodeErrorKind,
    pub message: String,
    pub position: Option<Position>,
}

impl CodeError {
    pub fn new<S: Into<String>>(kind: CodeErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
        }
    }

    pub fn parse_error<S: Into<String>>(position: Position, message: S) -> Self {
        Self::new(CodeErrorKind::Parse, message).or_position(&position)
    }

    /// The most specific position wins: an already attached position is kept.
    pub fn or_position(mut self, position: &Position) -> Self {
        if self.position.is_none() {
            self.position = Some(position.clone());
        }
        self
    }
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref position) = self.position {
            write!(f, "{}: ", position)?;
        }
        write!(f, "{}: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeErrorKind {
    Parse,
    Reference,
    Type,
}

impl fmt::Display for CodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeErrorKind::Parse => write!(f, "Parse error"),
            CodeErrorKind::Reference => write!(f, "Reference error"),
            CodeErrorKind::Type => write!(f, "Type error"),
        }
    }
}

/// A violated invariant of the compiler itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub struct InternalError {
    pub message: String,
    pub context: Vec<String>,
}

impl InternalError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            context: vec![],
        }
    }

    pub fn with_context<T: fmt::Debug + ?Sized>(mut self, label: &str, value: &T) -> Self {
        self.context.push(format!("{}: {:#?}", label, value));
        self
    }
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "internal compiler error: {}", self.message)?;
        for context in &self.context {
            write!(f, "\n  {}", context)?;
        }
        Ok(())
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn format_positioned_error() {
        let err = CodeError::new(CodeErrorKind::Type, "Unknown type vec3")
            .or_position(&Position::new("a.ffs", 2, 5));

        assert_eq!(err.to_string(), "a.ffs:2:5: Type error: Unknown type vec3");
    }

    #[test]
    fn format_unpositioned_error() {
        let err = CodeError::new(CodeErrorKind::Reference, "count not defined");
        assert_eq!(err.to_string(), "Reference error: count not defined");
    }

    #[test]
    fn position_is_never_overwritten() {
        let inner = Position::new("a.ffs", 7, 3);
        let outer = Position::new("a.ffs", 1, 1);

        let err = CompileError::type_error("boom")
            .or_position(&inner)
            .or_position(&outer);

        assert_matches!(err, CompileError::Code(CodeError { position: Some(pos), .. }) => {
            assert_eq!(pos, inner);
        });
    }

    #[test]
    fn internal_errors_are_not_positioned() {
        let err = CompileError::internal("no type").or_position(&Position::new("a.ffs", 1, 1));

        assert!(err.is_internal());
        assert_eq!(err.to_string(), "internal compiler error: no type");
    }
}
