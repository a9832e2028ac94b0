//! In-memory model of a Qt Linguist `.ts` catalog.
//! The reader in [`crate::format`] decodes into these; the writer serializes them.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityKey, identity_of};

/// One parsed `.ts` file: root attributes plus the ordered list of contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Catalog {
    /// Format version from the `version` attribute (usually `2.1`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,

    /// The `sourcelanguage` attribute.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_language: Option<String>,

    /// The `language` attribute (target language).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,

    /// `catalog` attributes of the `<dependencies>` block, in document order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependencies: Vec<String>,

    /// Contexts in document order. Names may repeat.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub contexts: Vec<Context>,
}

impl Catalog {
    pub fn new(source_language: Option<String>, language: Option<String>) -> Self {
        Catalog {
            version: Some(crate::format::DEFAULT_VERSION.to_string()),
            source_language,
            language,
            dependencies: Vec::new(),
            contexts: Vec::new(),
        }
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    /// First context with the given name.
    pub fn find_context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Looks up a message by identity across all contexts.
    pub fn find_message(&self, identity: &IdentityKey) -> Option<&Message> {
        self.contexts
            .iter()
            .filter(|c| c.name == identity.context)
            .flat_map(|c| c.messages.iter())
            .find(|m| identity_of(m, &identity.context) == *identity)
    }

    /// Iterates over every message together with its context, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&Context, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c, m)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Identity keys of all messages, in document order.
    pub fn identities(&self) -> Vec<IdentityKey> {
        self.messages()
            .map(|(c, m)| identity_of(m, &c.name))
            .collect()
    }
}

/// A named group of messages, usually one per source class or file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Context {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,

    /// Legacy `encoding` attribute, kept verbatim.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub encoding: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Identity of a message as if it lived in this context.
    pub fn identity_of(&self, message: &Message) -> IdentityKey {
        identity_of(message, &self.name)
    }
}

/// The atomic translatable unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    #[serde(default)]
    pub numerus: bool,

    /// Provenance hints. Never part of identity.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Location>,

    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub old_source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub old_comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extra_comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub translator_comment: Option<String>,

    /// Translations that lost a conflict, written as XML comments before
    /// `<translation>`. Not part of identity or content equality.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternatives: Vec<String>,

    pub translation: Translation,

    pub state: TranslationState,

    /// `extra-*` elements, preserved in document order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extras: Vec<Extra>,
}

impl Message {
    /// A new, untranslated message.
    pub fn new(source: impl Into<String>) -> Self {
        Message {
            source: source.into(),
            state: TranslationState::Unfinished,
            ..Default::default()
        }
    }

    pub fn with_translation(mut self, text: impl Into<String>, state: TranslationState) -> Self {
        self.translation = Translation::Singular(text.into());
        self.state = state;
        self
    }

    pub fn with_numerus_forms(mut self, forms: Vec<String>, state: TranslationState) -> Self {
        self.numerus = true;
        self.translation = Translation::Numerus(forms);
        self.state = state;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: Option<&str>) -> Self {
        self.locations.push(Location {
            filename: Some(filename.into()),
            line: line.map(str::to_string),
        });
        self
    }

    pub fn has_translation(&self) -> bool {
        !self.translation.is_empty()
    }

    /// Attribute-for-attribute equality, ignoring `locations` and
    /// `alternatives`. An untranslated plural equals any other untranslated
    /// plural, however many empty forms either one spells out.
    pub fn same_content(&self, other: &Message) -> bool {
        let same_translation = self.translation == other.translation
            || (self.numerus && self.translation.is_empty() && other.translation.is_empty());

        self.id == other.id
            && self.numerus == other.numerus
            && self.source == other.source
            && self.old_source == other.old_source
            && self.comment == other.comment
            && self.old_comment == other.old_comment
            && self.extra_comment == other.extra_comment
            && self.translator_comment == other.translator_comment
            && same_translation
            && self.state == other.state
            && self.extras == other.extras
    }

    /// Appends alternatives not already present, skipping empty text and
    /// the message's own translation.
    pub fn merge_alternatives<'a>(&mut self, alternatives: impl IntoIterator<Item = &'a str>) {
        let current = self.translation.to_string();
        for alternative in alternatives {
            if alternative.is_empty()
                || alternative == current
                || self.alternatives.iter().any(|a| a == alternative)
            {
                continue;
            }
            self.alternatives.push(alternative.to_string());
        }
    }

    /// Appends locations not already present, keeping first-seen order.
    pub fn merge_locations<'a>(&mut self, locations: impl IntoIterator<Item = &'a Location>) {
        for location in locations {
            if !self.locations.contains(location) {
                self.locations.push(location.clone());
            }
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Message {{ source: {}, translation: {}, state: {} }}",
            self.source, self.translation, self.state
        )
    }
}

/// A `(file, line)` provenance hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub filename: Option<String>,

    /// Kept as written; relative locations use an explicit sign (`+3`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<String>,
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum Translation {
    /// Plain translation text.
    Singular(String),

    /// One `<numerusform>` per plural form of the target language.
    Numerus(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Translation::Singular(String::new())
    }
}

impl Translation {
    /// True when no form carries any text.
    pub fn is_empty(&self) -> bool {
        match self {
            Translation::Singular(text) => text.is_empty(),
            Translation::Numerus(forms) => forms.iter().all(String::is_empty),
        }
    }
}

impl Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Translation::Singular(text) => write!(f, "{}", text),
            Translation::Numerus(forms) => write!(f, "{}", forms.join(" | ")),
        }
    }
}

/// Value of the `type` attribute of `<translation>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationState {
    /// No `type` attribute: translation is done.
    Finished,

    /// Needs translation or review.
    #[default]
    Unfinished,

    /// The source string disappeared from the code (set by lupdate).
    Vanished,

    /// Marked obsolete by hand.
    Obsolete,
}

impl TranslationState {
    /// Preference order used by the default conflict policy.
    pub fn rank(self) -> u8 {
        match self {
            TranslationState::Finished => 2,
            TranslationState::Unfinished => 1,
            TranslationState::Vanished | TranslationState::Obsolete => 0,
        }
    }

    /// The attribute value, or `None` for finished translations.
    pub fn type_attribute(self) -> Option<&'static str> {
        match self {
            TranslationState::Finished => None,
            TranslationState::Unfinished => Some("unfinished"),
            TranslationState::Vanished => Some("vanished"),
            TranslationState::Obsolete => Some("obsolete"),
        }
    }

    /// True for vanished or obsolete messages.
    pub fn is_dead(self) -> bool {
        matches!(
            self,
            TranslationState::Vanished | TranslationState::Obsolete
        )
    }
}

impl Display for TranslationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.type_attribute().unwrap_or("finished"))
    }
}

impl FromStr for TranslationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "finished" => Ok(TranslationState::Finished),
            "unfinished" => Ok(TranslationState::Unfinished),
            "vanished" => Ok(TranslationState::Vanished),
            "obsolete" => Ok(TranslationState::Obsolete),
            _ => Err(format!("Unknown translation type: {}", s)),
        }
    }
}

/// An `extra-*` element carried through merge untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Extra {
    pub name: String,
    pub value: String,
}
