//! File-level helpers: read catalogs from disk, merge them, write the result.
//!
//! Output is only written after the merge returned a complete catalog, so a
//! failed or cancelled merge never leaves a partial file behind.

use std::path::Path;

use crate::{
    error::Error,
    language::infer_language_from_path,
    merge::{MergeOptions, MergeReport, merge_catalogs_with_report},
    resolver::ConflictResolver,
    traits::Parser,
    types::Catalog,
};

/// Reads and parses one catalog.
///
/// When the root carries no `language` attribute, it is taken from a file
/// name of the form `name-xx.ts` or `name-xx_YY.ts`. Errors name the file.
pub fn read_catalog<P: AsRef<Path>>(path: P) -> Result<Catalog, Error> {
    let path = path.as_ref();
    let mut catalog = Catalog::read_from(path).map_err(|e| Error::in_file(path, e))?;

    if catalog.language.is_none() {
        if let Some(language) = infer_language_from_path(path) {
            tracing::debug!(
                path = %path.display(),
                language = %language,
                "inferred language from file name"
            );
            catalog.language = Some(language);
        }
    }

    Ok(catalog)
}

/// Serializes `catalog` in memory, then writes it to `path` in one go.
pub fn write_catalog<P: AsRef<Path>>(catalog: &Catalog, path: P) -> Result<(), Error> {
    let path = path.as_ref();
    catalog.write_to(path).map_err(|e| Error::in_file(path, e))
}

/// Reads every input, merges them and writes the result to `output`.
pub fn merge_files<P: AsRef<Path>, Q: AsRef<Path>>(
    inputs: &[P],
    output: Q,
    resolver: Option<&mut dyn ConflictResolver>,
    options: &MergeOptions,
) -> Result<MergeReport, Error> {
    let catalogs = inputs
        .iter()
        .map(read_catalog)
        .collect::<Result<Vec<_>, _>>()?;
    let (merged, report) = merge_catalogs_with_report(&catalogs, resolver, options)?;
    write_catalog(&merged, output)?;
    Ok(report)
}
