//! Governance policy configuration
//!
//! Handles loading of an optional `governance.yaml` at the repository root
//! and overlaying it onto the built-in policy tables. Absent file means
//! built-in defaults; absent sections keep the built-in rule data.

use crate::error::{Error, Result};
use crate::policy::{PolicyTables, PrefixPolicy};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "governance.yaml";

/// Repository governance configuration (`governance.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GovernanceConfig {
    /// Schema version for migrations
    pub version: u32,

    /// Override for the frozen legacy path rule set
    pub restricted: Option<RuleOverride>,

    /// Override for the deprecated root rule set
    pub deprecated_roots: Option<RuleOverride>,

    /// Override for the shared foundation rule set
    pub shared_foundation: Option<RuleOverride>,

    /// Override for the paths that count as an ADR update
    pub adr_locations: Option<RuleOverride>,

    /// Replacement list of required governance documents
    pub required_docs: Option<Vec<String>>,

    /// Replacement list of required OpenAPI context specs
    pub required_openapi_specs: Option<Vec<String>>,
}

/// Partial override of one prefix rule set (absent fields keep the built-in
/// values)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RuleOverride {
    pub prefixes: Option<Vec<String>>,
    pub exceptions: Option<Vec<String>>,
}

impl GovernanceConfig {
    /// Load `governance.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_file).map_err(Error::Io)?;
        let config: GovernanceConfig = serde_norway::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        // Validate version
        if config.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, config.version
            )));
        }

        Ok(Some(config))
    }

    /// Overlay onto the built-in tables to produce the effective rule data
    #[must_use]
    pub fn merge(&self, base: &PolicyTables) -> PolicyTables {
        PolicyTables {
            restricted: overlay(&base.restricted, self.restricted.as_ref()),
            deprecated_roots: overlay(&base.deprecated_roots, self.deprecated_roots.as_ref()),
            shared_foundation: overlay(&base.shared_foundation, self.shared_foundation.as_ref()),
            adr_locations: overlay(&base.adr_locations, self.adr_locations.as_ref()),
            required_docs: self
                .required_docs
                .clone()
                .unwrap_or_else(|| base.required_docs.clone()),
            required_openapi_specs: self
                .required_openapi_specs
                .clone()
                .unwrap_or_else(|| base.required_openapi_specs.clone()),
            openapi_dir: base.openapi_dir.clone(),
            settings_file: base.settings_file.clone(),
        }
    }
}

fn overlay(base: &PrefixPolicy, over: Option<&RuleOverride>) -> PrefixPolicy {
    let Some(over) = over else {
        return base.clone();
    };
    PrefixPolicy {
        name: base.name,
        prefixes: over
            .prefixes
            .clone()
            .unwrap_or_else(|| base.prefixes.clone()),
        exceptions: over
            .exceptions
            .clone()
            .unwrap_or_else(|| base.exceptions.clone()),
    }
}

/// Effective rule data for a repository: built-in defaults, overlaid with
/// `governance.yaml` when present
pub fn effective_tables(root: &Path) -> Result<PolicyTables> {
    let base = PolicyTables::default();
    match GovernanceConfig::load_from_dir(root)? {
        Some(config) => Ok(config.merge(&base)),
        None => Ok(base),
    }
}
