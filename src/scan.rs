//! Legacy use-case numbering scan
//!
//! Flags the retired `UC<nn>` identifier convention in source-like tracked
//! files. Only paths with a `/src/` segment are scanned; build output and
//! tool metadata trees are skipped, as are non-source extensions.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

const SCAN_EXTENSIONS: &[&str] = &[
    "java",
    "kt",
    "kts",
    "groovy",
    "gradle",
    "md",
    "yml",
    "yaml",
    "properties",
    "xml",
    "sql",
    "txt",
    "json",
];

const SKIP_SEGMENTS: &[&str] = &[
    ".git",
    ".gradle",
    "build",
    "out",
    "bin",
    "target",
    "node_modules",
];

static UC_MARKER: OnceLock<Regex> = OnceLock::new();

fn uc_marker() -> &'static Regex {
    UC_MARKER.get_or_init(|| Regex::new(r"(?i)\buc\d{2,3}").expect("legacy marker pattern"))
}

fn is_scannable(path: &str) -> bool {
    if !path.contains("/src/") {
        return false;
    }
    if path.split('/').any(|seg| SKIP_SEGMENTS.contains(&seg)) {
        return false;
    }
    match path.rsplit_once('.') {
        Some((_, ext)) => SCAN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Scan tracked source files for legacy use-case markers.
///
/// One hit per line (the first match), reported as `path:line: token` with
/// 1-based line numbers. Unreadable files are skipped.
pub fn scan_legacy_use_case_markers(root: &Path, tracked: &[String]) -> Vec<String> {
    let pattern = uc_marker();
    let mut hits = Vec::new();
    for rel in tracked.iter().filter(|p| is_scannable(p)) {
        let content = match std::fs::read_to_string(root.join(rel)) {
            Ok(c) => c,
            Err(err) => {
                debug!("skipping unreadable {}: {}", rel, err);
                continue;
            }
        };
        for (idx, line) in content.lines().enumerate() {
            if let Some(m) = pattern.find(line) {
                hits.push(format!("{}:{}: {}", rel, idx + 1, m.as_str()));
            }
        }
    }
    hits
}
