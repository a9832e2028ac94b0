//! Conflict resolution.
//!
//! When several inputs carry different versions of the same message, the
//! merge engine hands a [`ConflictDescriptor`] to a [`ConflictResolver`] and
//! uses whatever message comes back (as long as its identity is unchanged).

use crate::{
    error::Error,
    identity::{IdentityKey, OrderKey, order_key_of},
    types::Message,
};

/// Where one occurrence of a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Provenance {
    /// Index of the input catalog.
    pub catalog: usize,
    /// Position of the context inside that catalog.
    pub context: usize,
    /// Position of the message inside that context.
    pub position: usize,
}

impl Provenance {
    pub fn order_key(&self) -> OrderKey {
        order_key_of(self.catalog, self.context, self.position)
    }
}

/// One distinct version of a conflicting message, with every occurrence
/// that carried it. Occurrences differing only in locations share a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub message: Message,
    pub provenance: Vec<Provenance>,
}

impl Candidate {
    /// Input catalogs this candidate appears in, ascending and de-duplicated.
    pub fn catalogs(&self) -> Vec<usize> {
        let mut catalogs: Vec<usize> = self.provenance.iter().map(|p| p.catalog).collect();
        catalogs.sort_unstable();
        catalogs.dedup();
        catalogs
    }

    /// Order key of the earliest occurrence.
    pub fn first_seen(&self) -> Option<OrderKey> {
        self.provenance.iter().map(Provenance::order_key).min()
    }

    /// Order key of the latest occurrence.
    pub fn last_seen(&self) -> Option<OrderKey> {
        self.provenance.iter().map(Provenance::order_key).max()
    }
}

/// Everything a resolver needs to decide one conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDescriptor {
    pub identity: IdentityKey,
    /// At least two candidates, in first-seen order.
    pub candidates: Vec<Candidate>,
}

impl ConflictDescriptor {
    /// True when one input catalog contributed more than one candidate.
    pub fn is_duplicate_within_catalog(&self) -> bool {
        let mut seen = Vec::new();
        for candidate in &self.candidates {
            for catalog in candidate.catalogs() {
                if seen.contains(&catalog) {
                    return true;
                }
                seen.push(catalog);
            }
        }
        false
    }
}

/// Decides which message survives a conflict.
pub trait ConflictResolver {
    /// Returns the message to keep. Its identity must equal `conflict.identity`.
    fn resolve(&mut self, conflict: &ConflictDescriptor) -> Result<Message, Error>;
}

impl<F> ConflictResolver for F
where
    F: FnMut(&ConflictDescriptor) -> Result<Message, Error>,
{
    fn resolve(&mut self, conflict: &ConflictDescriptor) -> Result<Message, Error> {
        self(conflict)
    }
}

/// Deterministic, non-interactive conflict policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictStrategy {
    /// Finished beats unfinished beats vanished/obsolete; then a non-empty
    /// translation beats an empty one; then the later input wins.
    #[default]
    Preferred,
    /// Keep the version seen first.
    First,
    /// Keep the version seen last.
    Last,
}

impl ConflictStrategy {
    /// Index of the winning candidate, or `None` when there are no candidates.
    pub fn choose(&self, conflict: &ConflictDescriptor) -> Option<usize> {
        let candidates = conflict.candidates.iter().enumerate();
        let chosen = match self {
            ConflictStrategy::Preferred => candidates.max_by_key(|(_, c)| {
                (
                    c.message.state.rank(),
                    c.message.has_translation(),
                    c.last_seen(),
                )
            }),
            ConflictStrategy::First => candidates.min_by_key(|(_, c)| c.first_seen()),
            ConflictStrategy::Last => candidates.max_by_key(|(_, c)| c.last_seen()),
        };
        chosen.map(|(index, _)| index)
    }
}

impl ConflictResolver for ConflictStrategy {
    fn resolve(&mut self, conflict: &ConflictDescriptor) -> Result<Message, Error> {
        let index = self
            .choose(conflict)
            .ok_or_else(|| Error::InvalidResolution {
                identity: conflict.identity.to_string(),
                reason: "conflict has no candidates".to_string(),
            })?;
        Ok(conflict.candidates[index].message.clone())
    }
}

/// A list-selection primitive, typically a terminal menu.
pub trait Selector {
    /// Shows `options` under `title` and returns the picked index,
    /// or `None` when the user cancelled.
    fn select(&mut self, title: &str, options: &[String]) -> Result<Option<usize>, Error>;
}

/// Resolves each conflict by asking a [`Selector`].
pub struct InteractiveResolver<S> {
    selector: S,
    labels: Vec<String>,
}

impl<S: Selector> InteractiveResolver<S> {
    pub fn new(selector: S) -> Self {
        InteractiveResolver {
            selector,
            labels: Vec::new(),
        }
    }

    /// Names used for input catalogs in option labels (usually file names).
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn into_inner(self) -> S {
        self.selector
    }

    fn option_label(&self, candidate: &Candidate) -> String {
        let translation = if candidate.message.has_translation() {
            candidate.message.translation.to_string()
        } else {
            "<empty>".to_string()
        };
        let sources: Vec<String> = candidate
            .catalogs()
            .into_iter()
            .map(|index| {
                self.labels
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", index))
            })
            .collect();
        format!(
            "[{}] {}  ({})",
            candidate.message.state,
            translation,
            sources.join(", ")
        )
    }
}

impl<S: Selector> ConflictResolver for InteractiveResolver<S> {
    fn resolve(&mut self, conflict: &ConflictDescriptor) -> Result<Message, Error> {
        let title = format!("Conflicting translations for {}", conflict.identity);
        let options: Vec<String> = conflict
            .candidates
            .iter()
            .map(|c| self.option_label(c))
            .collect();

        match self.selector.select(&title, &options)? {
            None => Err(Error::Cancelled(conflict.identity.to_string())),
            Some(index) => conflict
                .candidates
                .get(index)
                .map(|c| c.message.clone())
                .ok_or_else(|| Error::InvalidResolution {
                    identity: conflict.identity.to_string(),
                    reason: format!(
                        "selected option {} but only {} exist",
                        index,
                        conflict.candidates.len()
                    ),
                }),
        }
    }
}
