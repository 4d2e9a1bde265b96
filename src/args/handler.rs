//! Handler seam — what runs when an argument is dispatched.

use thiserror::Error;

/// Failure reported by an argument handler.
///
/// The dispatcher never inspects this value; it is wrapped verbatim into
/// [`DispatchError::HandlerFailure`](crate::args::DispatchError::HandlerFailure).
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler-specific numeric failure code.
    #[error("handler failed with code {0}")]
    Code(i32),

    /// Handler refused the given value.
    #[error("{0}")]
    Rejected(String),

    /// A value argument was given in switch form.
    #[error("a value is required (use TAG=VALUE)")]
    MissingValue,

    /// A switch argument was given a value.
    #[error("unexpected value '{0}'")]
    UnexpectedValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Callback invoked once per matching token during dispatch.
///
/// `value` is `None` for the switch form (`-tag`) and `Some` with the text
/// after `=` for the value form (`-tag=value`); the text may be empty.
pub trait ArgHandler: Send + Sync {
    fn invoke(&self, value: Option<&str>) -> Result<(), HandlerError>;
}

impl<F> ArgHandler for F
where
    F: Fn(Option<&str>) -> Result<(), HandlerError> + Send + Sync,
{
    fn invoke(&self, value: Option<&str>) -> Result<(), HandlerError> {
        self(value)
    }
}
