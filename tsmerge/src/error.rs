//! All error types for the tsmerge crate.
//!
//! These are returned from all fallible operations (parsing, merging, conflict
//! resolution, writing). Every variant is fatal for the merge that produced it:
//! no output is written once an error has been returned.

use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

/// Which language attribute of the `<TS>` root disagreed between inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageField {
    /// The `sourcelanguage` attribute.
    Source,
    /// The `language` attribute (target language).
    Target,
}

impl Display for LanguageField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageField::Source => write!(f, "source"),
            LanguageField::Target => write!(f, "target"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),

    #[error("malformed catalog: XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no catalogs to merge")]
    EmptyInput,

    #[error(
        "{field} language mismatch: catalog {index} declares `{found}`, but an earlier catalog declares `{expected}`"
    )]
    LanguageMismatch {
        field: LanguageField,
        index: usize,
        expected: String,
        found: String,
    },

    #[error("invalid resolution for `{identity}`: {reason}")]
    InvalidResolution { identity: String, reason: String },

    #[error("conflict resolution cancelled at `{0}`")]
    Cancelled(String),

    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Creates a new malformed catalog error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedCatalog(message.into())
    }

    /// Attaches the path of the offending file to an error.
    pub fn in_file(path: impl Into<PathBuf>, source: Error) -> Self {
        Error::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Returns true when the input could not be parsed as a catalog.
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::MalformedCatalog(_) | Error::XmlParse(_) => true,
            Error::InFile { source, .. } => source.is_malformed(),
            _ => false,
        }
    }

    /// Returns true when the user aborted an interactive resolution.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled(_) => true,
            Error::InFile { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}
