// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # Govgate — Repository Governance Gate
//!
//! A CI / pre-commit change gate for repositories migrating off a legacy
//! module layout. Govgate inspects the current git diff plus the full
//! tracked-file list and reports every policy violation it finds, then
//! exits `0` (clean, warnings permitted) or `1` (at least one error).
//!
//! ## Checks
//!
//! | Check | Finding | Override |
//! |-------|---------|----------|
//! | Changes under frozen legacy paths | error | `ALLOW_LEGACY_PATH_EDITS` |
//! | Changes under deprecated roots | error | `ALLOW_DEPRECATED_ROOT_CHANGES` |
//! | Deprecated modules still in `settings.gradle` | error | none |
//! | Residual tracked files in deprecated roots | warning | escalated by `STRICT_DEPRECATED_ROOTS` |
//! | Shared foundation changed without an ADR | error | `ALLOW_SHARED_FOUNDATION_CHANGE` |
//! | Legacy use-case numbering in sources | error | none |
//! | Protected OpenAPI operations without DPoP | error | none |
//! | Required OpenAPI specs missing or hollow | error | none |
//!
//! Required governance documents are checked first; a repository missing
//! one fails immediately without running the rule checks.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use govgate::{effective_tables, env_snapshot, gate};
//!
//! let root = Path::new(".");
//! let tables = effective_tables(root)?;
//! let report = gate::run(root, &env_snapshot(), &tables);
//! print!("{}", report.to_report());
//! std::process::exit(report.exit_code());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! environment + git state
//!      │
//!      ├──► diff::detect_diff_mode ──► DiffMode
//!      ├──► diff::collect_changed_and_deleted / tracked_files
//!      ├──► scan::scan_legacy_use_case_markers
//!      ├──► openapi::collect_dpop_issues / collect_structure_issues
//!      │
//!      ▼
//! ValidationContext ──► evaluate::evaluate_context ──► ValidationResult
//! ```
//!
//! Everything left of `ValidationContext` performs I/O; the evaluator is a
//! pure function and trivially safe to re-run. Rule data lives in
//! [`policy::PolicyTables`] and can be overridden per repository with a
//! `governance.yaml` (see [`config::GovernanceConfig`]).

// Rule data and configuration
pub mod config;
pub mod error;
pub mod policy;

// Repository inspection (all I/O lives here)
pub mod diff;
pub mod openapi;
pub mod scan;

// Evaluation and orchestration
pub mod evaluate;
pub mod gate;

// Re-exports
pub use config::{effective_tables, GovernanceConfig, RuleOverride};
pub use diff::{collect_changed_and_deleted, detect_diff_mode, tracked_files, DiffMode};
pub use error::{Error, Result};
pub use evaluate::{evaluate_context, ValidationContext, ValidationResult};
pub use gate::{env_snapshot, flag_from_env, GateReport};
pub use openapi::{
    collect_dpop_issues, collect_structure_issues, extract_operation_blocks,
    operation_enforces_dpop, spec_has_required_dpop_parameter, OperationBlock,
};
pub use policy::{PolicyTables, PrefixPolicy};
pub use scan::scan_legacy_use_case_markers;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
