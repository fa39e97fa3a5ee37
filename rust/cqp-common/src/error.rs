use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn precondition(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Precondition {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn allocation(what: impl Into<String>) -> Error {
        Error(ErrorKind::AllocationFailed { what: what.into() }.into())
    }

    pub fn external_tool(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::ExternalTool {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn interrupted(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::Interrupted {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn internal(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Internal {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        Error(
            ErrorKind::Io {
                context: context.into(),
                source,
            }
            .into(),
        )
    }

    /// Returns `true` if the operation was stopped by the user rather than
    /// failing.
    pub fn is_interrupted(&self) -> bool {
        matches!(self.kind(), ErrorKind::Interrupted { .. })
    }

    /// Returns `true` if the error signals a broken internal invariant.
    pub fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Internal { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("precondition violated: {message}")]
    Precondition { message: String },

    #[error("failed to allocate {what}")]
    AllocationFailed { what: String },

    #[error("external sort failed: {message}")]
    ExternalTool { message: String },

    #[error("{operation} interrupted by user")]
    Interrupted { operation: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("IO error while {context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io("performing I/O", e)
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        Error::allocation(e.to_string())
    }
}
