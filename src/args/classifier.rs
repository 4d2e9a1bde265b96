//! Argument classifier — raw tokens → relation table (validation pass).
//!
//! Nothing in here runs a handler. Classification only reads the registry and
//! builds per-call state, so it can be repeated on the same input freely.

use crate::args::registry::ArgRegistry;

/// Match result for one input token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEntry {
    /// Not classified yet.
    Unresolved,
    /// Token matched the descriptor at this registry index.
    Matched(usize),
    /// Token matched no descriptor.
    Unknown,
}

/// Per-call mapping from token position to registry match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTable {
    entries: Vec<RelationEntry>,
}

impl RelationTable {
    fn unresolved(len: usize) -> Self {
        Self {
            entries: vec![RelationEntry::Unresolved; len],
        }
    }

    pub fn entries(&self) -> &[RelationEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Usage accounting for one descriptor during one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageState {
    pub count: u32,
    pub misused: bool,
}

/// A token that matched no registered argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken {
    /// Position in the token slice (program name already stripped).
    pub position: usize,
    pub token: String,
}

/// Result of the validation pass.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Relation for every token, in input order.
    pub table: RelationTable,
    /// Usage per descriptor, indexed like the registry.
    pub usage: Vec<UsageState>,
    /// Every unknown token, in input order.
    pub unknown: Vec<UnknownToken>,
}

impl Classification {
    /// Registry indices of misused descriptors, in declaration order.
    pub fn misused(&self) -> Vec<usize> {
        self.usage
            .iter()
            .enumerate()
            .filter(|(_, u)| u.misused)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.usage.iter().all(|u| !u.misused)
    }
}

/// Classify tokens against the registry.
///
/// The whole input is scanned even after the first problem so that every
/// unknown token and every misused descriptor is reported at once.
pub fn classify<S: AsRef<str>>(registry: &ArgRegistry, tokens: &[S]) -> Classification {
    let mut table = RelationTable::unresolved(tokens.len());
    let mut usage = vec![UsageState::default(); registry.len()];
    let mut unknown = Vec::new();

    for (position, token) in tokens.iter().enumerate() {
        let token = token.as_ref();

        let Some(index) = match_descriptor(registry, token) else {
            tracing::debug!(position, token, "Unknown argument");
            unknown.push(UnknownToken {
                position,
                token: token.to_string(),
            });
            table.entries[position] = RelationEntry::Unknown;
            continue;
        };

        let state = &mut usage[index];
        state.count += 1;

        if let Some(d) = registry.get(index) {
            if state.count > d.policy().allowance() && !state.misused {
                tracing::debug!(
                    tag = d.tag(),
                    count = state.count,
                    allowance = d.policy().allowance(),
                    "Argument used more often than allowed"
                );
                state.misused = true;
            }
        }

        table.entries[position] = RelationEntry::Matched(index);
    }

    Classification {
        table,
        usage,
        unknown,
    }
}

/// Registry index for a token in switch (`tag`) or value (`tag=...`) form.
///
/// A token that merely starts with a tag (e.g. `-arg1xyz`) is not a match.
fn match_descriptor(registry: &ArgRegistry, token: &str) -> Option<usize> {
    let index = registry.lookup(token)?;
    let tag_len = registry.get(index)?.tag_len();

    match token.as_bytes().get(tag_len) {
        None | Some(b'=') => Some(index),
        Some(_) => None,
    }
}
