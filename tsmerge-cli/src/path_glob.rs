use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use ignore::WalkBuilder;
use rayon::prelude::*;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

fn is_ts_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ts"))
}

// Extract a static directory prefix before the first glob meta-character
fn static_prefix_dir(pattern: &str) -> PathBuf {
    let bytes = pattern.as_bytes();
    let mut idx = 0usize;
    while idx < bytes.len() {
        match bytes[idx] {
            b'*' | b'?' | b'[' | b'{' => break,
            _ => idx += 1,
        }
    }
    let prefix = &pattern[..idx];
    let p = Path::new(prefix);
    if p.is_dir() {
        p.to_path_buf()
    } else {
        p.parent()
            .filter(|pp| !pp.as_os_str().is_empty())
            .map(|pp| pp.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// All `*.ts` files directly inside `dir`, sorted by path.
fn expand_directory(dir: &Path) -> Result<Vec<String>, String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("Cannot read directory {}: {}", dir.display(), e))?;
    let mut files: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_ts_file(path))
        .map(|path| path.to_string_lossy().to_string())
        .collect();
    files.sort();
    Ok(files)
}

/// Files under the pattern's static prefix that match it, sorted by path.
/// Uses ignore + globset for a .gitignore-aware traversal.
fn expand_glob(pattern: &str) -> Result<Vec<String>, String> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?
        .compile_matcher();

    let root = static_prefix_dir(pattern);
    let walker = WalkBuilder::new(&root)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .hidden(false)
        .ignore(true)
        .parents(true)
        .build();

    let mut out: Vec<String> = Vec::new();
    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(_e) => continue,
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        // Walking "." yields "./a.ts"; match the pattern as the user wrote it.
        let path = dent.path();
        let relative = path.strip_prefix(".").unwrap_or(path);
        if matcher.is_match(path) || matcher.is_match(relative) {
            out.push(path.to_string_lossy().to_string());
        }
    }
    out.sort();
    Ok(out)
}

/// Expand directories and glob patterns in `inputs` into concrete file paths.
///
/// Directories contribute every `*.ts` file directly inside them. Plain paths
/// are kept as given, and so are patterns that match nothing, so the missing
/// file is reported later. Input order is kept; duplicates are dropped.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<String>, String> {
    let expanded: Vec<Vec<String>> = inputs
        .par_iter()
        .map(|input| {
            let path = Path::new(input);
            if path.is_dir() {
                expand_directory(path)
            } else if has_glob_meta(input) {
                let matched = expand_glob(input)?;
                if matched.is_empty() {
                    Ok(vec![input.clone()])
                } else {
                    Ok(matched)
                }
            } else {
                Ok(vec![input.clone()])
            }
        })
        .collect::<Result<_, String>>()?;

    // Deduplicate while preserving order
    let mut seen: HashSet<String> = HashSet::new();
    let mut results: Vec<String> = Vec::new();
    for s in expanded.into_iter().flatten() {
        if seen.insert(s.clone()) {
            results.push(s);
        }
    }
    tracing::debug!(inputs = inputs.len(), files = results.len(), "expanded inputs");
    Ok(results)
}
