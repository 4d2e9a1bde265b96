//! Dispatcher — validate the whole argument vector, then run handlers.
//!
//! ```text
//! tokens → [limit check] → classify → {Unknown | Misuse | clean} → dispatch in input order
//! ```
//!
//! No handler runs unless every token is known and every reuse policy holds.

use thiserror::Error;

use crate::args::classifier::{classify, RelationEntry, RelationTable, UnknownToken};
use crate::args::handler::HandlerError;
use crate::args::registry::ArgRegistry;

/// Exit code for a misuse (reuse policy violation).
pub const EXIT_MISUSE: i32 = -1;
/// Exit code for unknown arguments.
pub const EXIT_UNKNOWN: i32 = -3;
/// Exit code for an argument vector over the token limit.
pub const EXIT_TOO_MANY: i32 = -4;
/// Base of the handler failure range `[i32::MIN, -64]`; the failing token's
/// position is subtracted from it.
pub const EXIT_HANDLER_BASE: i32 = -64;

/// Errors produced by [`Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// One or more tokens match no registered argument.
    #[error("{} invalid argument(s): {}", .tokens.len(), format_unknown(.tokens))]
    UnknownArgument { tokens: Vec<UnknownToken> },

    /// One or more arguments were used more often than their policy allows.
    #[error("Argument(s) used too many times: {}", .tags.join(", "))]
    Misuse { tags: Vec<String> },

    /// The argument vector is longer than the configured limit.
    #[error("Maximum arguments supported: {max}, given: {given}")]
    TooManyArguments { given: usize, max: usize },

    /// A handler failed; handlers before it have already run.
    #[error("Handler for '{tag}' (argument {index}) failed: {source}")]
    HandlerFailure {
        index: usize,
        tag: String,
        #[source]
        source: HandlerError,
    },
}

fn format_unknown(tokens: &[UnknownToken]) -> String {
    tokens
        .iter()
        .map(|t| format!("{} (at {})", t.token, t.position))
        .collect::<Vec<_>>()
        .join(", ")
}

impl DispatchError {
    /// Conventional process exit code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            DispatchError::UnknownArgument { .. } => EXIT_UNKNOWN,
            DispatchError::Misuse { .. } => EXIT_MISUSE,
            DispatchError::TooManyArguments { .. } => EXIT_TOO_MANY,
            DispatchError::HandlerFailure { index, .. } => {
                let offset = i32::try_from(*index).unwrap_or(i32::MAX);
                EXIT_HANDLER_BASE.saturating_sub(offset)
            }
        }
    }

    /// True when the failure was found before any handler ran.
    pub fn is_side_effect_free(&self) -> bool {
        !matches!(self, DispatchError::HandlerFailure { .. })
    }
}

/// Outcome of one dispatch call; `Ok(())` is success.
pub type ParseOutcome = Result<(), DispatchError>;

/// Map an outcome to its conventional exit code (0 on success).
pub fn exit_code(outcome: &ParseOutcome) -> i32 {
    match outcome {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

/// Runs the two-pass protocol against a registry.
///
/// Holds no usage state of its own; every call starts from zero counts, so a
/// dispatcher (and its registry) can be shared and reused.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r ArgRegistry,
    max_tokens: Option<usize>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r ArgRegistry) -> Self {
        Self {
            registry,
            max_tokens: None,
        }
    }

    /// Reject argument vectors longer than `max` tokens before validating.
    pub fn with_max_tokens(mut self, max: Option<usize>) -> Self {
        self.max_tokens = max;
        self
    }

    /// Validation pass only. Runs no handler and leaves no state behind.
    pub fn validate<S: AsRef<str>>(&self, tokens: &[S]) -> Result<RelationTable, DispatchError> {
        if let Some(max) = self.max_tokens {
            if tokens.len() > max {
                tracing::debug!(given = tokens.len(), max, "Too many arguments");
                return Err(DispatchError::TooManyArguments {
                    given: tokens.len(),
                    max,
                });
            }
        }

        let classification = classify(self.registry, tokens);

        if !classification.unknown.is_empty() {
            for u in &classification.unknown {
                tracing::debug!(position = u.position, token = %u.token, "Invalid argument");
            }
            return Err(DispatchError::UnknownArgument {
                tokens: classification.unknown,
            });
        }

        let misused = classification.misused();
        if !misused.is_empty() {
            let tags: Vec<String> = misused
                .into_iter()
                .filter_map(|i| self.registry.get(i))
                .map(|d| d.tag().to_string())
                .collect();
            tracing::debug!(tags = ?tags, "Duplicated argument found");
            return Err(DispatchError::Misuse { tags });
        }

        Ok(classification.table)
    }

    /// Validate all tokens, then invoke their handlers in input order.
    ///
    /// Stops at the first handler failure. Effects of handlers that already
    /// ran are not undone.
    pub fn dispatch<S: AsRef<str>>(&self, tokens: &[S]) -> ParseOutcome {
        if tokens.is_empty() {
            return Ok(());
        }

        let table = self.validate(tokens)?;

        for (index, (token, entry)) in tokens.iter().zip(table.entries()).enumerate() {
            let RelationEntry::Matched(j) = *entry else {
                continue;
            };
            let Some(descriptor) = self.registry.get(j) else {
                continue;
            };

            let token = token.as_ref();
            // classification guarantees len >= tag_len and '=' right after the tag
            let value = if token.len() == descriptor.tag_len() {
                None
            } else {
                Some(&token[descriptor.tag_len() + 1..])
            };

            tracing::debug!(index, tag = descriptor.tag(), value = ?value, "Dispatching argument");

            if let Err(source) = descriptor.handler().invoke(value) {
                tracing::info!(index, tag = descriptor.tag(), error = %source, "Handler failed");
                return Err(DispatchError::HandlerFailure {
                    index,
                    tag: descriptor.tag().to_string(),
                    source,
                });
            }
        }

        tracing::debug!(count = tokens.len(), "All arguments dispatched");
        Ok(())
    }
}
