//! Pure policy evaluation
//!
//! Every rule here is a pure function of [`ValidationContext`]: all git
//! calls and file reads happen before evaluation, in [`crate::diff`],
//! [`crate::scan`] and [`crate::openapi`]. Rules run in a fixed order and
//! never short-circuit one another, so a single run reports everything.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::policy::PolicyTables;

/// Full input snapshot for one evaluation. Built once by the gate driver,
/// never mutated mid-evaluation.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub changed_files: Vec<String>,
    pub deleted_files: Vec<String>,
    pub tracked_files: Vec<String>,
    /// Raw text of the module-inclusion manifest, empty if unreadable
    pub settings_content: String,
    pub allow_legacy_path_edits: bool,
    pub allow_deprecated_root_changes: bool,
    pub allow_shared_foundation_change: bool,
    pub strict_deprecated_roots: bool,
    pub legacy_use_case_hits: Vec<String>,
    pub openapi_dpop_issues: Vec<String>,
    pub openapi_structure_issues: Vec<String>,
}

/// Ordered findings from one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// Render the plain-text report: one `ERROR:`/`WARN:` block per
    /// finding, with a trailing pass line only when no error was recorded.
    #[must_use]
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        for error in &self.errors {
            out.push_str("ERROR: ");
            out.push_str(error);
            out.push('\n');
        }
        for warning in &self.warnings {
            out.push_str("WARN: ");
            out.push_str(warning);
            out.push('\n');
        }
        if self.passed() {
            out.push_str("Repository governance checks passed.\n");
        }
        out
    }
}

fn block(summary: &str, items: &[String]) -> String {
    let mut msg = String::from(summary);
    for item in items {
        msg.push_str("\n  - ");
        msg.push_str(item);
    }
    msg
}

/// Run every governance rule over the context, in fixed order, and collect
/// all applicable findings.
#[must_use]
pub fn evaluate_context(tables: &PolicyTables, ctx: &ValidationContext) -> ValidationResult {
    let mut result = ValidationResult::default();

    let restricted = tables
        .restricted
        .blocked_changes(&ctx.changed_files, &ctx.deleted_files);
    if !restricted.is_empty() && !ctx.allow_legacy_path_edits {
        result.errors.push(block(
            "Changes under frozen legacy paths detected (set ALLOW_LEGACY_PATH_EDITS=true to override):",
            &restricted,
        ));
    }

    let deprecated = tables
        .deprecated_roots
        .blocked_changes(&ctx.changed_files, &ctx.deleted_files);
    if !deprecated.is_empty() && !ctx.allow_deprecated_root_changes {
        result.errors.push(block(
            "Changes under deprecated roots detected (set ALLOW_DEPRECATED_ROOT_CHANGES=true to override):",
            &deprecated,
        ));
    }

    // cannot be waived: the manifest must drop deprecated modules outright
    let includes = tables.deprecated_settings_includes(&ctx.settings_content);
    if !includes.is_empty() {
        result.errors.push(block(
            &format!("{} still includes deprecated modules:", tables.settings_file),
            &includes,
        ));
    }

    let residual = tables.residual_tracked_files(&ctx.tracked_files, &ctx.deleted_files);
    if !residual.is_empty() {
        result.warnings.push(block(
            "Residual tracked files remain under deprecated roots:",
            &residual,
        ));
        if ctx.strict_deprecated_roots {
            result.errors.push(block(
                "Residual tracked files are forbidden while STRICT_DEPRECATED_ROOTS=true:",
                &residual,
            ));
        }
    }

    let foundation = tables
        .shared_foundation
        .blocked_changes(&ctx.changed_files, &ctx.deleted_files);
    let adr_updated = ctx
        .changed_files
        .iter()
        .any(|f| tables.adr_locations.in_scope(f));
    if !foundation.is_empty() && !adr_updated && !ctx.allow_shared_foundation_change {
        result.errors.push(block(
            "Shared foundation changed without an accompanying ADR update (set ALLOW_SHARED_FOUNDATION_CHANGE=true to override):",
            &foundation,
        ));
    }

    if !ctx.legacy_use_case_hits.is_empty() {
        result.errors.push(block(
            "Found legacy use-case numbering in source files:",
            &ctx.legacy_use_case_hits,
        ));
    }

    if !ctx.openapi_dpop_issues.is_empty() {
        result.errors.push(block(
            "OpenAPI protected operations are missing DPoP enforcement:",
            &ctx.openapi_dpop_issues,
        ));
    }

    if !ctx.openapi_structure_issues.is_empty() {
        result.errors.push(block(
            "OpenAPI structure validation failed:",
            &ctx.openapi_structure_issues,
        ));
    }

    result
}
