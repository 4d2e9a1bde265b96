//! Argument registry and dispatcher.
//!
//! A fixed table of `-tag` / `-tag=value` arguments is checked against the
//! whole argument vector before any handler runs:
//!
//! ```text
//! tokens → Classify (relation table, usage counts) → Validate → Dispatch (input order)
//! ```
//!
//! Classification is a pure function of the registry and the tokens, so it
//! can be unit-tested and repeated without side effects.

mod classifier;
mod dispatcher;
mod handler;
mod registry;

pub use classifier::{
    classify, Classification, RelationEntry, RelationTable, UnknownToken, UsageState,
};
pub use dispatcher::{
    exit_code, DispatchError, Dispatcher, ParseOutcome, EXIT_HANDLER_BASE, EXIT_MISUSE,
    EXIT_TOO_MANY, EXIT_UNKNOWN,
};
pub use handler::{ArgHandler, HandlerError};
pub use registry::{ArgRegistry, ArgumentDescriptor, RegistryBuilder, RegistryError, ReusePolicy};
