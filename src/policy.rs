//! Policy rule tables and change classification
//!
//! The rule data is plain declarative state: four prefix rule sets plus the
//! required-document and required-spec lists, bundled into `PolicyTables`.
//! Classification is pure; the evaluator receives lists, never does I/O.

use std::collections::HashSet;

const RESTRICTED_PREFIXES: &[&str] = &["archive/", "temp-src/", "simple-test/"];
const RESTRICTED_EXCEPTIONS: &[&str] = &[
    "archive/README.md",
    "temp-src/README.md",
    "simple-test/README.md",
];

const DEPRECATED_ROOT_PREFIXES: &[&str] = &["loan-service/", "bankwide/"];
const DEPRECATED_ROOT_EXCEPTIONS: &[&str] = &["loan-service/README.md", "bankwide/README.md"];

const SHARED_FOUNDATION_PREFIXES: &[&str] = &["shared-kernel/", "shared-infrastructure/"];

const ADR_LOCATION_PREFIXES: &[&str] = &["docs/architecture/adr/"];

const REQUIRED_DOCS: &[&str] = &[
    "docs/architecture/REPOSITORY_STRUCTURE_POLICY.md",
    "docs/GENERAL_BACKLOG.md",
    "docs/architecture/MODULE_OWNERSHIP_MAP.md",
];

const REQUIRED_OPENAPI_SPECS: &[&str] = &[
    "customer-context.yaml",
    "loan-context.yaml",
    "payment-context.yaml",
    "risk-context.yaml",
    "compliance-context.yaml",
];

const OPENAPI_DIR: &str = "api/openapi";
const SETTINGS_FILE: &str = "settings.gradle";

/// One named prefix rule set: paths in scope by prefix, minus exact-path
/// exceptions
#[derive(Debug, Clone)]
pub struct PrefixPolicy {
    pub name: &'static str,
    pub prefixes: Vec<String>,
    pub exceptions: Vec<String>,
}

impl PrefixPolicy {
    pub fn new(name: &'static str, prefixes: &[&str], exceptions: &[&str]) -> Self {
        Self {
            name,
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            exceptions: exceptions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// True if `path` starts with any of the rule's prefixes
    #[must_use]
    pub fn in_scope(&self, path: &str) -> bool {
        self.prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    /// True if `path` is an exact-match exception
    #[must_use]
    pub fn is_exception(&self, path: &str) -> bool {
        self.exceptions.iter().any(|e| e == path)
    }

    /// Changed files blocked by this rule set. A deleted file is never
    /// blocked: removing it from the area is the remediation.
    pub fn blocked_changes(&self, changed: &[String], deleted: &[String]) -> Vec<String> {
        let deleted: HashSet<&str> = deleted.iter().map(String::as_str).collect();
        changed
            .iter()
            .filter(|f| self.in_scope(f) && !self.is_exception(f) && !deleted.contains(f.as_str()))
            .cloned()
            .collect()
    }
}

/// The complete rule data for one gate run
#[derive(Debug, Clone)]
pub struct PolicyTables {
    pub restricted: PrefixPolicy,
    pub deprecated_roots: PrefixPolicy,
    pub shared_foundation: PrefixPolicy,
    pub adr_locations: PrefixPolicy,
    pub required_docs: Vec<String>,
    pub required_openapi_specs: Vec<String>,
    pub openapi_dir: String,
    pub settings_file: String,
}

impl Default for PolicyTables {
    fn default() -> Self {
        Self {
            restricted: PrefixPolicy::new("restricted", RESTRICTED_PREFIXES, RESTRICTED_EXCEPTIONS),
            deprecated_roots: PrefixPolicy::new(
                "deprecated-root",
                DEPRECATED_ROOT_PREFIXES,
                DEPRECATED_ROOT_EXCEPTIONS,
            ),
            shared_foundation: PrefixPolicy::new(
                "shared-foundation",
                SHARED_FOUNDATION_PREFIXES,
                &[],
            ),
            adr_locations: PrefixPolicy::new("adr-locations", ADR_LOCATION_PREFIXES, &[]),
            required_docs: REQUIRED_DOCS.iter().map(|d| d.to_string()).collect(),
            required_openapi_specs: REQUIRED_OPENAPI_SPECS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            openapi_dir: OPENAPI_DIR.to_string(),
            settings_file: SETTINGS_FILE.to_string(),
        }
    }
}

impl PolicyTables {
    /// Tracked files still sitting under a deprecated root: in scope, not a
    /// retained README, not deleted in this change set. Computed over the
    /// full tracked list, not the diff.
    pub fn residual_tracked_files(&self, tracked: &[String], deleted: &[String]) -> Vec<String> {
        let deleted: HashSet<&str> = deleted.iter().map(String::as_str).collect();
        tracked
            .iter()
            .filter(|f| {
                self.deprecated_roots.in_scope(f)
                    && !self.deprecated_roots.is_exception(f)
                    && !deleted.contains(f.as_str())
            })
            .cloned()
            .collect()
    }

    /// Required governance documents not present in `existing`, in required
    /// order
    pub fn missing_required_docs(&self, existing: &[String]) -> Vec<String> {
        let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
        self.required_docs
            .iter()
            .filter(|d| !existing.contains(d.as_str()))
            .cloned()
            .collect()
    }

    /// Deprecated module names still included by the settings manifest.
    /// Tokens are derived from the deprecated-root prefixes and matched
    /// against whitespace-normalized manifest text.
    pub fn deprecated_settings_includes(&self, settings_content: &str) -> Vec<String> {
        let normalized = settings_content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        self.deprecated_roots
            .prefixes
            .iter()
            .map(|p| p.trim_end_matches('/'))
            .filter(|name| normalized.contains(&format!("include '{}'", name)))
            .map(|name| name.to_string())
            .collect()
    }
}
