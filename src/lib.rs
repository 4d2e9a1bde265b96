//! Declarative command-line argument table with validate-then-dispatch.
//!
//! Arguments are registered once as `-tag` switches or `-tag=value` pairs,
//! each with a reuse policy and a handler. [`args::Dispatcher`] checks the
//! whole argument vector before running any handler.

pub mod args;
pub mod config;
pub mod handlers;
pub mod logging;
