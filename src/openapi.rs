//! OpenAPI contract checks
//!
//! A line/indentation state machine recovers operation blocks from a spec
//! document; no YAML document model is built. The pass/fail boundary is the
//! textual shape the repository's contracts follow: 2-space path keys,
//! 4-space HTTP verbs, 6-space operation fields. Two checks run over it:
//! DPoP enforcement on protected operations and structural presence of the
//! required context specs.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::policy::PolicyTables;

/// One path+verb operation recovered from a spec document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationBlock {
    /// API path template, e.g. `/accounts/{id}`
    pub path: String,
    /// Lower-cased HTTP verb
    pub method: String,
    /// Raw lines of the operation, up to the next path or verb marker
    pub body: Vec<String>,
}

static PATH_MARKER: OnceLock<Regex> = OnceLock::new();
static METHOD_MARKER: OnceLock<Regex> = OnceLock::new();

fn path_marker() -> &'static Regex {
    PATH_MARKER.get_or_init(|| {
        Regex::new(r#"^  ['"]?(/[^:'"]*)['"]?:\s*$"#).expect("path marker pattern")
    })
}

fn method_marker() -> &'static Regex {
    METHOD_MARKER.get_or_init(|| {
        Regex::new(r"(?i)^    (get|put|post|delete|patch|options|head|trace):\s*$")
            .expect("method marker pattern")
    })
}

/// Extract operation blocks in document order.
///
/// A 2-space path key sets the current path; a 4-space verb under it opens a
/// block whose body runs to the next path or verb marker, regardless of
/// deeper nesting. A document with no path markers yields no blocks.
pub fn extract_operation_blocks(lines: &[String]) -> Vec<OperationBlock> {
    let mut blocks: Vec<OperationBlock> = Vec::new();
    let mut current_path: Option<String> = None;
    let mut open: Option<OperationBlock> = None;

    for line in lines {
        if let Some(caps) = path_marker().captures(line) {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            current_path = Some(caps[1].to_string());
            continue;
        }
        if let Some(caps) = method_marker().captures(line) {
            if let Some(block) = open.take() {
                blocks.push(block);
            }
            if let Some(path) = &current_path {
                open = Some(OperationBlock {
                    path: path.clone(),
                    method: caps[1].to_lowercase(),
                    body: Vec::new(),
                });
            }
            continue;
        }
        if let Some(block) = open.as_mut() {
            block.body.push(line.clone());
        }
    }
    if let Some(block) = open.take() {
        blocks.push(block);
    }
    blocks
}

fn is_protected(body: &[String]) -> bool {
    body.iter().any(|l| l.starts_with("      security:"))
}

/// True iff the operation is protected and carries the DPoP parameter,
/// either as the literal component reference or inlined with `name: DPoP`,
/// `in: header`, `required: true` all present in the body.
pub fn operation_enforces_dpop(body: &[String]) -> bool {
    if !is_protected(body) {
        return false;
    }
    if body
        .iter()
        .any(|l| l.contains("#/components/parameters/DPoP"))
    {
        return true;
    }
    let contains = |needle: &str| body.iter().any(|l| l.contains(needle));
    contains("name: DPoP") && contains("in: header") && contains("required: true")
}

/// True iff `components.parameters.DPoP` declares a mandatory header
/// parameter: `name: DPoP`, `in: header`, `required: true`, each on its own
/// 6-space line inside the block.
pub fn spec_has_required_dpop_parameter(lines: &[String]) -> bool {
    let mut found = false;
    let mut block: Vec<&str> = Vec::new();
    for line in lines {
        if !found {
            if line.trim_end() == "    DPoP:" {
                found = true;
            }
            continue;
        }
        // the next key at 4-space indentation (or shallower) ends the block
        if !line.trim().is_empty() && !line.starts_with("      ") {
            break;
        }
        block.push(line.as_str());
    }
    if !found {
        return false;
    }
    let field = |want: &str| {
        block
            .iter()
            .any(|l| l.trim_end().strip_prefix("      ") == Some(want))
    };
    field("name: DPoP") && field("in: header") && field("required: true")
}

fn is_api_spec(path: &str, openapi_dir: &str) -> bool {
    let dir = format!("{}/", openapi_dir.trim_end_matches('/'));
    path.starts_with(&dir) && (path.ends_with(".yaml") || path.ends_with(".yml"))
}

/// DPoP issues across all tracked API specs, in tracked order.
///
/// Per spec file: one issue per protected operation missing the parameter
/// (`spec:path METHOD missing required DPoP header parameter`), then one
/// document-level issue if any operation was protected but the component
/// block is absent or not mandatory. Unreadable files are skipped.
pub fn collect_dpop_issues(root: &Path, tracked: &[String], tables: &PolicyTables) -> Vec<String> {
    let mut issues = Vec::new();
    for rel in tracked.iter().filter(|p| is_api_spec(p, &tables.openapi_dir)) {
        let content = match std::fs::read_to_string(root.join(rel)) {
            Ok(c) => c,
            Err(err) => {
                debug!("skipping unreadable {}: {}", rel, err);
                continue;
            }
        };
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let mut any_protected = false;
        for block in extract_operation_blocks(&lines) {
            if !is_protected(&block.body) {
                continue;
            }
            any_protected = true;
            if !operation_enforces_dpop(&block.body) {
                issues.push(format!(
                    "{}:{} {} missing required DPoP header parameter",
                    rel,
                    block.path,
                    block.method.to_uppercase()
                ));
            }
        }
        if any_protected && !spec_has_required_dpop_parameter(&lines) {
            issues.push(format!(
                "{}: components.parameters.DPoP must declare name: DPoP, in: header, required: true",
                rel
            ));
        }
    }
    issues
}

/// Structural issues for the required context specs, in required order.
///
/// At most one issue per spec: not tracked, missing on disk, unreadable,
/// literal `paths: {}`, or no concrete path markers at all.
pub fn collect_structure_issues(
    root: &Path,
    tracked: &[String],
    tables: &PolicyTables,
) -> Vec<String> {
    let tracked_set: HashSet<&str> = tracked.iter().map(String::as_str).collect();
    let mut issues = Vec::new();
    for name in &tables.required_openapi_specs {
        let rel = format!("{}/{}", tables.openapi_dir.trim_end_matches('/'), name);
        if !tracked_set.contains(rel.as_str()) {
            issues.push(format!("{}: required OpenAPI spec is not tracked", rel));
            continue;
        }
        let full = root.join(&rel);
        if !full.exists() {
            issues.push(format!("{}: required OpenAPI spec is missing", rel));
            continue;
        }
        let content = match std::fs::read_to_string(&full) {
            Ok(c) => c,
            Err(err) => {
                debug!("unable to read {}: {}", rel, err);
                issues.push(format!("{}: unable to read required OpenAPI spec", rel));
                continue;
            }
        };
        if content.lines().any(|l| l.trim() == "paths: {}") {
            issues.push(format!("{}: paths are empty (paths: {{}})", rel));
            continue;
        }
        if !content.lines().any(|l| path_marker().is_match(l)) {
            issues.push(format!("{}: no concrete API paths found", rel));
        }
    }
    issues
}
