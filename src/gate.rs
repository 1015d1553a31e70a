//! Gate driver
//!
//! Wires the diff resolver, the repository scanners and the evaluator into
//! one run. All I/O happens here and in the modules it calls into; by the
//! time [`crate::evaluate::evaluate_context`] runs, the context is a frozen
//! snapshot.

use std::collections::HashMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diff::{collect_changed_and_deleted, detect_diff_mode, tracked_files};
use crate::evaluate::{evaluate_context, ValidationContext, ValidationResult};
use crate::openapi::{collect_dpop_issues, collect_structure_issues};
use crate::policy::PolicyTables;
use crate::scan::scan_legacy_use_case_markers;

/// True iff the variable is present and case-insensitively equal to `true`
#[must_use]
pub fn flag_from_env(env: &HashMap<String, String>, name: &str) -> bool {
    env.get(name).is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Snapshot of the process environment
#[must_use]
pub fn env_snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Outcome of one full gate run
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GateReport {
    /// Diff mode the run resolved to
    pub diff_mode: String,
    /// Required governance documents absent from the repository; when
    /// non-empty the rule checks did not run
    pub missing_docs: Vec<String>,
    /// Rule findings
    pub result: ValidationResult,
}

impl GateReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.missing_docs.is_empty() && self.result.passed()
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    /// Plain-text report for the terminal
    #[must_use]
    pub fn to_report(&self) -> String {
        if !self.missing_docs.is_empty() {
            let mut out = String::new();
            for doc in &self.missing_docs {
                out.push_str("ERROR: required governance document missing: ");
                out.push_str(doc);
                out.push('\n');
            }
            return out;
        }
        self.result.to_report()
    }
}

fn missing_docs_on_disk(root: &Path, tables: &PolicyTables) -> Vec<String> {
    let existing: Vec<String> = tables
        .required_docs
        .iter()
        .filter(|doc| root.join(doc.as_str()).is_file())
        .cloned()
        .collect();
    tables.missing_required_docs(&existing)
}

/// Run the full gate against a repository root.
///
/// The required-docs precondition is checked first and short-circuits the
/// run; the scanners never execute against a repository that fails it.
#[must_use]
pub fn run(root: &Path, env: &HashMap<String, String>, tables: &PolicyTables) -> GateReport {
    let mode = detect_diff_mode(root, env);
    debug!("diff mode: {}", mode.label());

    let (changed_files, deleted_files) = collect_changed_and_deleted(root, &mode);
    debug!(
        "{} changed, {} deleted",
        changed_files.len(),
        deleted_files.len()
    );

    let missing_docs = missing_docs_on_disk(root, tables);
    if !missing_docs.is_empty() {
        return GateReport {
            diff_mode: mode.label().to_string(),
            missing_docs,
            result: ValidationResult::default(),
        };
    }

    let tracked = tracked_files(root);

    let settings_content = match std::fs::read_to_string(root.join(&tables.settings_file)) {
        Ok(content) => content,
        Err(err) => {
            debug!("no readable {}: {}", tables.settings_file, err);
            String::new()
        }
    };

    let legacy_use_case_hits = scan_legacy_use_case_markers(root, &tracked);
    let openapi_dpop_issues = collect_dpop_issues(root, &tracked, tables);
    let openapi_structure_issues = collect_structure_issues(root, &tracked, tables);

    let ctx = ValidationContext {
        changed_files,
        deleted_files,
        tracked_files: tracked,
        settings_content,
        allow_legacy_path_edits: flag_from_env(env, "ALLOW_LEGACY_PATH_EDITS"),
        allow_deprecated_root_changes: flag_from_env(env, "ALLOW_DEPRECATED_ROOT_CHANGES"),
        allow_shared_foundation_change: flag_from_env(env, "ALLOW_SHARED_FOUNDATION_CHANGE"),
        strict_deprecated_roots: flag_from_env(env, "STRICT_DEPRECATED_ROOTS"),
        legacy_use_case_hits,
        openapi_dpop_issues,
        openapi_structure_issues,
    };

    GateReport {
        diff_mode: mode.label().to_string(),
        missing_docs: Vec::new(),
        result: evaluate_context(tables, &ctx),
    }
}
