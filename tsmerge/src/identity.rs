//! Message identity and first-seen ordering.
//!
//! Two messages with equal [`IdentityKey`]s are the same message for merge
//! purposes, whatever their translations say. The key is chosen in a fixed
//! order:
//!
//! 1. `(context, id)` when the message has a non-empty `id`;
//! 2. `(context, source, comment)` when it has a non-empty disambiguating comment;
//! 3. `(context, source)` otherwise.
//!
//! Collisions that survive this policy are conflicts, never silently dropped.

use std::fmt::Display;

use serde::Serialize;

use crate::types::Message;

/// Stable key used to match messages across catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    /// Context name. Contexts are matched by name, not by object.
    pub context: String,
    pub discriminant: Discriminant,
}

/// The part of an identity that distinguishes messages within a context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discriminant {
    /// Explicit message id.
    Id(String),
    /// Source text plus optional disambiguating comment.
    Source {
        source: String,
        comment: Option<String>,
    },
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.discriminant {
            Discriminant::Id(id) => write!(f, "{}::#{}", self.context, id),
            Discriminant::Source {
                source,
                comment: Some(comment),
            } => write!(f, "{}::{} ({})", self.context, source, comment),
            Discriminant::Source {
                source,
                comment: None,
            } => write!(f, "{}::{}", self.context, source),
        }
    }
}

/// Computes the identity of `message` inside the context named `context`.
pub fn identity_of(message: &Message, context: &str) -> IdentityKey {
    let discriminant = match message.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => Discriminant::Id(id.to_string()),
        None => Discriminant::Source {
            source: message.source.clone(),
            comment: message.comment.clone().filter(|c| !c.is_empty()),
        },
    };
    IdentityKey {
        context: context.to_string(),
        discriminant,
    }
}

/// Position of the first occurrence of a context or message in the input
/// sequence. Ordered by catalog, then context position, then message position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrderKey {
    pub catalog: usize,
    pub context: usize,
    pub message: usize,
}

/// Order key of a message occurrence.
pub fn order_key_of(catalog: usize, context: usize, message: usize) -> OrderKey {
    OrderKey {
        catalog,
        context,
        message,
    }
}

/// Order key of a context occurrence.
pub fn context_order_key(catalog: usize, context: usize) -> OrderKey {
    order_key_of(catalog, context, 0)
}
