//! Language tag helpers.
//!
//! Qt writes tags with underscores (`de_DE`), BCP-47 uses hyphens (`de-DE`).
//! Both spellings name the same language and must compare equal.

use std::{path::Path, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use unic_langid::LanguageIdentifier;

lazy_static! {
    // `app-de.ts`, `app-de_DE.ts`, `app-pt-BR.TS`
    static ref FILE_LANGUAGE_REGEX: Regex =
        Regex::new(r"^.*?-(?P<lang>[a-z]{2}(?:[-_][A-Z]{2})?)\.[tT][sS]$").unwrap();
}

/// Normalizes a language tag for comparison.
///
/// Underscores become hyphens and the tag is canonicalized with
/// `unic-langid` when it parses; otherwise it is only lowercased.
///
/// ```rust
/// use tsmerge::language::normalize_language_tag;
/// assert_eq!(normalize_language_tag("de_DE"), "de-DE");
/// assert_eq!(normalize_language_tag("EN"), "en");
/// ```
pub fn normalize_language_tag(tag: &str) -> String {
    let hyphenated = tag.trim().replace('_', "-");
    match LanguageIdentifier::from_str(&hyphenated) {
        Ok(id) => id.to_string(),
        Err(_) => hyphenated.to_lowercase(),
    }
}

/// True when both tags name the same language after normalization.
pub fn languages_match(a: &str, b: &str) -> bool {
    normalize_language_tag(a) == normalize_language_tag(b)
}

/// Extracts the language from a catalog file name such as `app-de_DE.ts`.
///
/// Returns the tag as written in the file name.
pub fn infer_language_from_path<P: AsRef<Path>>(path: P) -> Option<String> {
    let file_name = path.as_ref().file_name()?.to_str()?;
    FILE_LANGUAGE_REGEX
        .captures(file_name)
        .and_then(|caps| caps.name("lang"))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_language_tag() {
        assert_eq!(normalize_language_tag("de_DE"), "de-DE");
        assert_eq!(normalize_language_tag("de-de"), "de-DE");
        assert_eq!(normalize_language_tag("fr"), "fr");
        assert_eq!(normalize_language_tag("zh_Hans_CN"), "zh-Hans-CN");
        assert_eq!(normalize_language_tag("Not A Tag"), "not a tag");
    }

    #[test]
    fn test_languages_match() {
        assert!(languages_match("de_DE", "de-DE"));
        assert!(languages_match("en", "EN"));
        assert!(!languages_match("fr", "de"));
        assert!(!languages_match("pt_BR", "pt_PT"));
    }

    #[test]
    fn test_infer_language_from_path() {
        assert_eq!(
            infer_language_from_path("translations/app-de.ts"),
            Some("de".to_string())
        );
        assert_eq!(
            infer_language_from_path("i18n/my-app-pt_BR.TS"),
            Some("pt_BR".to_string())
        );
        assert_eq!(
            infer_language_from_path("app-zh-CN.ts"),
            Some("zh-CN".to_string())
        );
        assert_eq!(infer_language_from_path("app.ts"), None);
        assert_eq!(infer_language_from_path("app-de.xml"), None);
        assert_eq!(infer_language_from_path("app-DE.ts"), None);
    }
}
