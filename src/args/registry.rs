//! Argument registry — single source of truth for accepted arguments.

use std::fmt;

use thiserror::Error;

use crate::args::handler::{ArgHandler, HandlerError};

/// How many times an argument may appear in one argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReusePolicy {
    /// Exactly one occurrence is allowed; any repeat is misuse.
    Forbidden,
    /// Up to `n` occurrences are allowed (n >= 1).
    AllowedUpTo(u32),
}

impl ReusePolicy {
    /// Number of occurrences permitted by this policy.
    pub fn allowance(self) -> u32 {
        match self {
            ReusePolicy::Forbidden => 1,
            ReusePolicy::AllowedUpTo(n) => n,
        }
    }
}

/// A single registered argument.
pub struct ArgumentDescriptor {
    tag: String,
    policy: ReusePolicy,
    handler: Box<dyn ArgHandler>,
}

impl ArgumentDescriptor {
    /// Literal prefix an input token must start with (e.g., "-arg2").
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Byte length of the tag.
    pub fn tag_len(&self) -> usize {
        self.tag.len()
    }

    pub fn policy(&self) -> ReusePolicy {
        self.policy
    }

    pub fn handler(&self) -> &dyn ArgHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for ArgumentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentDescriptor")
            .field("tag", &self.tag)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Errors detected while building a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Argument tag must not be empty")]
    EmptyTag,

    #[error("Argument tag '{tag}' must start with '-'")]
    MissingDash { tag: String },

    #[error("Argument tag '{tag}' must not contain '='")]
    ContainsSeparator { tag: String },

    #[error("Argument tag '{tag}' is registered twice")]
    DuplicateTag { tag: String },

    #[error("Argument tag '{shorter}' is a prefix of '{longer}'")]
    AmbiguousPrefix { shorter: String, longer: String },

    #[error("Argument tag '{tag}' allows zero uses")]
    ZeroAllowance { tag: String },
}

/// Immutable, ordered set of argument descriptors.
///
/// Built once through [`RegistryBuilder`]; no registration happens afterwards.
#[derive(Debug)]
pub struct ArgRegistry {
    descriptors: Vec<ArgumentDescriptor>,
}

impl ArgRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Find the first descriptor (in declaration order) whose tag is a byte
    /// prefix of `token`.
    ///
    /// This only answers the prefix question. Whether the remainder of the
    /// token is a well-formed `=value` suffix is decided by the classifier.
    pub fn lookup(&self, token: &str) -> Option<usize> {
        self.descriptors
            .iter()
            .position(|d| token.as_bytes().starts_with(d.tag.as_bytes()))
    }

    pub fn get(&self, index: usize) -> Option<&ArgumentDescriptor> {
        self.descriptors.get(index)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All tags in declaration order.
    pub fn tags(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.tag()).collect()
    }

    /// Listing of accepted arguments, one per line.
    pub fn usage(&self) -> String {
        let mut out = String::from("Accepted arguments:\n");
        for d in &self.descriptors {
            let reuse = match d.policy {
                ReusePolicy::Forbidden => "once".to_string(),
                ReusePolicy::AllowedUpTo(n) => format!("up to {} times", n),
            };
            out.push_str(&format!("  {}[=VALUE]  ({})\n", d.tag, reuse));
        }
        out
    }
}

/// Builder for [`ArgRegistry`]. Checks the table invariants on `build()`.
#[derive(Default)]
pub struct RegistryBuilder {
    descriptors: Vec<ArgumentDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an argument handled by a closure. Declaration order is preserved.
    pub fn arg<F>(self, tag: impl Into<String>, policy: ReusePolicy, handler: F) -> Self
    where
        F: Fn(Option<&str>) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(tag, policy, handler)
    }

    /// Register an argument handled by any [`ArgHandler`] implementation.
    pub fn register<H>(mut self, tag: impl Into<String>, policy: ReusePolicy, handler: H) -> Self
    where
        H: ArgHandler + 'static,
    {
        self.descriptors.push(ArgumentDescriptor {
            tag: tag.into(),
            policy,
            handler: Box::new(handler),
        });
        self
    }

    pub fn build(self) -> Result<ArgRegistry, RegistryError> {
        for (i, d) in self.descriptors.iter().enumerate() {
            if d.tag.is_empty() {
                return Err(RegistryError::EmptyTag);
            }
            if !d.tag.starts_with('-') {
                return Err(RegistryError::MissingDash { tag: d.tag.clone() });
            }
            if d.tag.contains('=') {
                return Err(RegistryError::ContainsSeparator { tag: d.tag.clone() });
            }
            if d.policy.allowance() == 0 {
                return Err(RegistryError::ZeroAllowance { tag: d.tag.clone() });
            }

            for other in &self.descriptors[..i] {
                if other.tag == d.tag {
                    return Err(RegistryError::DuplicateTag { tag: d.tag.clone() });
                }
                let (shorter, longer) = if other.tag.len() < d.tag.len() {
                    (&other.tag, &d.tag)
                } else {
                    (&d.tag, &other.tag)
                };
                if longer.starts_with(shorter.as_str()) {
                    return Err(RegistryError::AmbiguousPrefix {
                        shorter: shorter.clone(),
                        longer: longer.clone(),
                    });
                }
            }
        }

        Ok(ArgRegistry {
            descriptors: self.descriptors,
        })
    }
}
