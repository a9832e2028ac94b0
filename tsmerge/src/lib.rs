#![forbid(unsafe_code)]
//! Merge Qt Linguist translation catalogs (`.ts` files).
//!
//! Several catalogs describing the same application are combined into one.
//! Messages are matched by identity (context plus source text, or an explicit
//! id, optionally disambiguated by comment); versions that disagree are
//! settled by a pluggable [`ConflictResolver`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tsmerge::{MergeOptions, merge_files};
//!
//! let report = merge_files(
//!     &["app-de.ts", "plugin-de.ts"],
//!     "merged-de.ts",
//!     None,
//!     &MergeOptions::default(),
//! )?;
//! println!("{} messages, {} conflicts", report.messages, report.conflicts.len());
//! # Ok::<(), tsmerge::Error>(())
//! ```
//!
//! # Features
//!
//! - Lossless reader and deterministic writer for the `.ts` dialect, including
//!   plural forms, length variants and `<byte>` escapes
//! - Default conflict policy that prefers finished translations, plus
//!   first/last strategies and a selector-driven interactive resolver
//! - Language checks across inputs (`de_DE` and `de-DE` are the same language)
//! - A serializable [`MergeReport`] describing every conflict
//! - Optionally keeps losing translations as `alternative translation`
//!   comments (see [`MergeOptions::keep_alternatives`])

pub mod codec;
pub mod error;
pub mod format;
pub mod identity;
pub mod language;
pub mod merge;
pub mod resolver;
pub mod traits;
pub mod types;

mod xml;

// Re-export most used types for easy consumption
pub use crate::{
    codec::{merge_files, read_catalog, write_catalog},
    error::{Error, LanguageField},
    identity::{Discriminant, IdentityKey, OrderKey, identity_of, order_key_of},
    merge::{
        ConflictRecord, DecisionKind, MergeDecision, MergeOptions, MergeReport, merge_catalogs,
        merge_catalogs_with_report,
    },
    resolver::{
        Candidate, ConflictDescriptor, ConflictResolver, ConflictStrategy, InteractiveResolver,
        Provenance, Selector,
    },
    types::{Catalog, Context, Extra, Location, Message, Translation, TranslationState},
};
