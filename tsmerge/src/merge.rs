//! The merge engine.
//!
//! Catalogs are flattened into `(catalog, context, message)` occurrences,
//! grouped by [`IdentityKey`] in first-seen order, and each group is reduced
//! to one message: copied when every occurrence agrees, handed to a
//! [`ConflictResolver`] otherwise.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    error::{Error, LanguageField},
    format::DEFAULT_VERSION,
    identity::{IdentityKey, OrderKey, context_order_key, identity_of},
    language::languages_match,
    resolver::{Candidate, ConflictDescriptor, ConflictResolver, ConflictStrategy, Provenance},
    types::{Catalog, Context, Message, TranslationState},
};

/// Knobs that change what ends up in the merged catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Drop messages whose final state is vanished or obsolete.
    pub drop_vanished: bool,

    /// Keep the distinct non-empty translations that lost a conflict as
    /// `<!-- alternative translation: ... -->` comments on the winner.
    pub keep_alternatives: bool,
}

/// How the message for one identity was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Present in exactly one place.
    Unique,
    /// Present several times, all equal apart from locations.
    Merged,
    /// Conflicting versions, settled by the resolver.
    Resolved,
}

/// Outcome for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeDecision {
    pub identity: IdentityKey,
    pub message: Message,
    pub provenance: Vec<Provenance>,
    pub kind: DecisionKind,
}

/// Summary of a merge, suitable for printing or serializing to JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub inputs: usize,
    pub contexts: usize,
    pub messages: usize,
    pub unique: usize,
    pub merged: usize,
    pub resolved: usize,
    pub dropped_messages: usize,
    pub dropped_contexts: usize,
    pub conflicts: Vec<ConflictRecord>,
}

/// One conflict and how it was settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub identity: IdentityKey,
    pub candidates: Vec<CandidateSummary>,
    /// Index into `candidates`, or `None` when the resolver built a new message.
    pub chosen: Option<usize>,
    /// One input carried two different versions of this message.
    pub duplicate_within_catalog: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub translation: String,
    pub state: TranslationState,
    pub catalogs: Vec<usize>,
}

impl ConflictRecord {
    fn new(conflict: &ConflictDescriptor, resolved: &Message) -> Self {
        ConflictRecord {
            identity: conflict.identity.clone(),
            candidates: conflict
                .candidates
                .iter()
                .map(|c| CandidateSummary {
                    translation: c.message.translation.to_string(),
                    state: c.message.state,
                    catalogs: c.catalogs(),
                })
                .collect(),
            chosen: conflict
                .candidates
                .iter()
                .position(|c| c.message.same_content(resolved)),
            duplicate_within_catalog: conflict.is_duplicate_within_catalog(),
        }
    }
}

/// Merges `catalogs` into a fresh catalog.
///
/// Conflicts go to `resolver`, or to [`ConflictStrategy::Preferred`] when
/// none is given.
///
/// # Example
///
/// ```rust
/// use tsmerge::{Catalog, Context, Message, TranslationState, merge_catalogs};
///
/// let mut a = Catalog::new(Some("en".to_string()), Some("fr".to_string()));
/// a.contexts.push(Context::new("Main").with_message(Message::new("Hello")));
///
/// let mut b = Catalog::new(Some("en".to_string()), Some("fr".to_string()));
/// b.contexts.push(Context::new("Main").with_message(
///     Message::new("Hello").with_translation("Bonjour", TranslationState::Finished),
/// ));
///
/// let merged = merge_catalogs(&[a, b], None)?;
/// let hello = &merged.contexts()[0].messages[0];
/// assert_eq!(hello.translation.to_string(), "Bonjour");
/// assert_eq!(hello.state, TranslationState::Finished);
/// Ok::<(), tsmerge::Error>(())
/// ```
pub fn merge_catalogs(
    catalogs: &[Catalog],
    resolver: Option<&mut dyn ConflictResolver>,
) -> Result<Catalog, Error> {
    merge_catalogs_with_report(catalogs, resolver, &MergeOptions::default())
        .map(|(catalog, _)| catalog)
}

/// Like [`merge_catalogs`], also returning a [`MergeReport`].
pub fn merge_catalogs_with_report(
    catalogs: &[Catalog],
    resolver: Option<&mut dyn ConflictResolver>,
    options: &MergeOptions,
) -> Result<(Catalog, MergeReport), Error> {
    if catalogs.is_empty() {
        return Err(Error::EmptyInput);
    }
    let source_language = agreed_language(catalogs, LanguageField::Source)?;
    let language = agreed_language(catalogs, LanguageField::Target)?;
    let version = catalogs
        .iter()
        .find_map(|c| c.version.clone())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());

    tracing::debug!(
        inputs = catalogs.len(),
        language = language.as_deref().unwrap_or("-"),
        "merging catalogs"
    );

    let mut fallback = ConflictStrategy::default();
    let resolver: &mut dyn ConflictResolver = match resolver {
        Some(resolver) => resolver,
        None => &mut fallback,
    };

    let (slots, groups) = group_messages(catalogs);

    let mut report = MergeReport {
        inputs: catalogs.len(),
        ..Default::default()
    };
    let mut decisions = Vec::with_capacity(groups.len());
    for group in &groups {
        let decision = decide(group, resolver, options, &mut report)?;
        match decision.kind {
            DecisionKind::Unique => report.unique += 1,
            DecisionKind::Merged => report.merged += 1,
            DecisionKind::Resolved => report.resolved += 1,
        }
        tracing::trace!(identity = %decision.identity, kind = ?decision.kind, "decided");
        decisions.push(Some(decision));
    }

    let mut merged = Catalog {
        version: Some(version),
        source_language,
        language,
        dependencies: Vec::new(),
        contexts: Vec::with_capacity(slots.len()),
    };
    for dependency in catalogs.iter().flat_map(|c| &c.dependencies) {
        if !merged.dependencies.contains(dependency) {
            merged.dependencies.push(dependency.clone());
        }
    }

    for slot in slots {
        let mut context = Context {
            name: slot.name.to_string(),
            comment: slot.comment.cloned(),
            encoding: slot.encoding.cloned(),
            messages: Vec::with_capacity(slot.groups.len()),
        };
        for index in &slot.groups {
            let Some(decision) = decisions[*index].take() else {
                continue;
            };
            if options.drop_vanished && decision.message.state.is_dead() {
                tracing::debug!(
                    identity = %decision.identity,
                    state = %decision.message.state,
                    "dropping dead message"
                );
                report.dropped_messages += 1;
                continue;
            }
            context.messages.push(decision.message);
        }

        if !slot.groups.is_empty() && context.messages.is_empty() {
            tracing::debug!(context = slot.name, "dropping context left without messages");
            report.dropped_contexts += 1;
            continue;
        }
        merged.contexts.push(context);
    }

    report.contexts = merged.contexts.len();
    report.messages = merged.message_count();
    tracing::debug!(
        contexts = report.contexts,
        messages = report.messages,
        conflicts = report.conflicts.len(),
        "merge finished"
    );

    Ok((merged, report))
}

/// Output context being assembled, keyed by name.
struct ContextSlot<'a> {
    name: &'a str,
    first_seen: OrderKey,
    comment: Option<&'a String>,
    encoding: Option<&'a String>,
    /// Indices into the group list, in first-seen order.
    groups: Vec<usize>,
}

/// Every occurrence of one identity.
struct Group<'a> {
    identity: IdentityKey,
    members: Vec<(Provenance, &'a Message)>,
}

fn group_messages(catalogs: &[Catalog]) -> (Vec<ContextSlot<'_>>, Vec<Group<'_>>) {
    let mut slots: Vec<ContextSlot> = Vec::new();
    let mut slot_index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<IdentityKey, usize> = HashMap::new();

    for (catalog_index, catalog) in catalogs.iter().enumerate() {
        tracing::debug!(
            catalog = catalog_index,
            contexts = catalog.contexts.len(),
            messages = catalog.message_count(),
            "collecting input"
        );
        for (context_index, context) in catalog.contexts.iter().enumerate() {
            let slot = *slot_index.entry(context.name.as_str()).or_insert_with(|| {
                slots.push(ContextSlot {
                    name: &context.name,
                    first_seen: context_order_key(catalog_index, context_index),
                    comment: None,
                    encoding: None,
                    groups: Vec::new(),
                });
                slots.len() - 1
            });
            let slot = &mut slots[slot];
            if slot.comment.is_none() {
                slot.comment = context.comment.as_ref();
            }
            if slot.encoding.is_none() {
                slot.encoding = context.encoding.as_ref();
            }

            for (position, message) in context.messages.iter().enumerate() {
                let identity = identity_of(message, &context.name);
                let provenance = Provenance {
                    catalog: catalog_index,
                    context: context_index,
                    position,
                };
                match group_index.get(&identity) {
                    Some(&index) => groups[index].members.push((provenance, message)),
                    None => {
                        group_index.insert(identity.clone(), groups.len());
                        slot.groups.push(groups.len());
                        groups.push(Group {
                            identity,
                            members: vec![(provenance, message)],
                        });
                    }
                }
            }
        }
    }

    slots.sort_by_key(|slot| slot.first_seen);
    (slots, groups)
}

/// Collapses occurrences that differ only in locations.
fn collapse(members: &[(Provenance, &Message)]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = Vec::new();
    for (provenance, message) in members {
        match candidates
            .iter_mut()
            .find(|c| c.message.same_content(message))
        {
            Some(candidate) => {
                candidate.message.merge_locations(&message.locations);
                candidate
                    .message
                    .merge_alternatives(message.alternatives.iter().map(String::as_str));
                candidate.provenance.push(*provenance);
            }
            None => candidates.push(Candidate {
                message: (*message).clone(),
                provenance: vec![*provenance],
            }),
        }
    }
    candidates
}

fn decide(
    group: &Group<'_>,
    resolver: &mut dyn ConflictResolver,
    options: &MergeOptions,
    report: &mut MergeReport,
) -> Result<MergeDecision, Error> {
    let mut candidates = collapse(&group.members);

    if candidates.len() == 1 {
        let kind = if group.members.len() == 1 {
            DecisionKind::Unique
        } else {
            DecisionKind::Merged
        };
        let Candidate {
            message,
            provenance,
        } = candidates.remove(0);
        return Ok(MergeDecision {
            identity: group.identity.clone(),
            message,
            provenance,
            kind,
        });
    }

    let conflict = ConflictDescriptor {
        identity: group.identity.clone(),
        candidates,
    };
    if conflict.is_duplicate_within_catalog() {
        tracing::warn!(identity = %conflict.identity, "conflicting duplicates within one catalog");
    }

    let mut message = resolver.resolve(&conflict)?;
    let resolved = identity_of(&message, &conflict.identity.context);
    if resolved != conflict.identity {
        return Err(Error::InvalidResolution {
            identity: conflict.identity.to_string(),
            reason: format!("resolver returned a message with identity `{}`", resolved),
        });
    }

    report.conflicts.push(ConflictRecord::new(&conflict, &message));
    if options.keep_alternatives {
        let losers: Vec<String> = conflict
            .candidates
            .iter()
            .flat_map(|c| {
                let own = c.message.alternatives.iter().cloned();
                std::iter::once(c.message.translation.to_string()).chain(own)
            })
            .collect();
        message.merge_alternatives(losers.iter().map(String::as_str));
        tracing::debug!(
            identity = %conflict.identity,
            alternatives = message.alternatives.len(),
            "kept alternative translations"
        );
    }
    Ok(MergeDecision {
        identity: conflict.identity,
        message,
        provenance: group.members.iter().map(|(p, _)| *p).collect(),
        kind: DecisionKind::Resolved,
    })
}

/// The language every input agrees on, as first written.
fn agreed_language(catalogs: &[Catalog], field: LanguageField) -> Result<Option<String>, Error> {
    let mut agreed: Option<&str> = None;
    for (index, catalog) in catalogs.iter().enumerate() {
        let tag = match field {
            LanguageField::Source => catalog.source_language.as_deref(),
            LanguageField::Target => catalog.language.as_deref(),
        };
        let Some(tag) = tag else {
            continue;
        };
        match agreed {
            None => agreed = Some(tag),
            Some(expected) if !languages_match(expected, tag) => {
                return Err(Error::LanguageMismatch {
                    field,
                    index,
                    expected: expected.to_string(),
                    found: tag.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(agreed.map(str::to_string))
}
