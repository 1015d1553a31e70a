//! Filesystem-facing OpenAPI contract checks
//!
//! Exercises the DPoP and structural collectors against spec documents laid
//! out in scratch directories, with the tracked list supplied explicitly.

use std::path::Path;

use govgate::{collect_dpop_issues, collect_structure_issues, PolicyTables};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn write_spec(root: &Path, rel: &str, content: &str) {
    let full = root.join(rel);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, content).unwrap();
}

fn tracked(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

// ============================================================================
// DPoP enforcement
// ============================================================================

const INSECURE_SPEC: &str = concat!(
    "openapi: 3.0.3\n",
    "paths:\n",
    "  /secure:\n",
    "    get:\n",
    "      security:\n",
    "        - bearerAuth: []\n",
    "      parameters:\n",
    "        - $ref: '#/components/parameters/Authorization'\n",
    "components:\n",
    "  parameters:\n",
    "    DPoP:\n",
    "      name: DPoP\n",
    "      in: header\n",
    "      required: false\n",
);

#[test]
fn test_dpop_issues_for_protected_operation_without_parameter() {
    let dir = tempfile::tempdir().unwrap();
    write_spec(dir.path(), "api/openapi/sample.yaml", INSECURE_SPEC);

    let issues = collect_dpop_issues(
        dir.path(),
        &tracked(&["api/openapi/sample.yaml"]),
        &PolicyTables::default(),
    );

    assert_eq!(
        issues,
        vec![
            "api/openapi/sample.yaml:/secure GET missing required DPoP header parameter"
                .to_string(),
            "api/openapi/sample.yaml: components.parameters.DPoP must declare name: DPoP, in: header, required: true"
                .to_string(),
        ]
    );
}

#[test]
fn test_dpop_passes_for_public_spec() {
    let dir = tempfile::tempdir().unwrap();
    write_spec(
        dir.path(),
        "api/openapi/public.yaml",
        "openapi: 3.0.3\npaths:\n  /public:\n    get:\n      summary: public endpoint\n",
    );

    let issues = collect_dpop_issues(
        dir.path(),
        &tracked(&["api/openapi/public.yaml"]),
        &PolicyTables::default(),
    );
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn test_dpop_only_scans_yaml_under_api_dir() {
    let dir = tempfile::tempdir().unwrap();
    // protected content in places the collector must not look at
    write_spec(dir.path(), "api/openapi/notes.md", INSECURE_SPEC);
    write_spec(dir.path(), "docs/sample.yaml", INSECURE_SPEC);

    let issues = collect_dpop_issues(
        dir.path(),
        &tracked(&["api/openapi/notes.md", "docs/sample.yaml"]),
        &PolicyTables::default(),
    );
    assert_eq!(issues, Vec::<String>::new());
}

#[test]
fn test_dpop_skips_unreadable_spec() {
    let dir = tempfile::tempdir().unwrap();
    // tracked entry with no file behind it, e.g. removed mid-run
    let issues = collect_dpop_issues(
        dir.path(),
        &tracked(&["api/openapi/ghost.yaml"]),
        &PolicyTables::default(),
    );
    assert_eq!(issues, Vec::<String>::new());
}

// ============================================================================
// Structural validation of the required context specs
// ============================================================================

#[test]
fn test_structure_reports_every_untracked_required_spec() {
    let dir = tempfile::tempdir().unwrap();
    let issues = collect_structure_issues(dir.path(), &[], &PolicyTables::default());

    assert_eq!(
        issues,
        vec![
            "api/openapi/customer-context.yaml: required OpenAPI spec is not tracked".to_string(),
            "api/openapi/loan-context.yaml: required OpenAPI spec is not tracked".to_string(),
            "api/openapi/payment-context.yaml: required OpenAPI spec is not tracked".to_string(),
            "api/openapi/risk-context.yaml: required OpenAPI spec is not tracked".to_string(),
            "api/openapi/compliance-context.yaml: required OpenAPI spec is not tracked".to_string(),
        ]
    );
}

#[rstest]
#[case::stub_paths("openapi: 3.0.3\npaths: {}\n", "paths are empty (paths: {})")]
#[case::no_path_markers("openapi: 3.0.3\ninfo:\n  title: empty\n", "no concrete API paths found")]
fn test_structure_flags_hollow_spec(#[case] content: &str, #[case] expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    write_spec(dir.path(), "api/openapi/customer-context.yaml", content);

    let issues = collect_structure_issues(
        dir.path(),
        &tracked(&["api/openapi/customer-context.yaml"]),
        &PolicyTables::default(),
    );

    // one issue for the hollow spec, one per remaining untracked spec
    assert_eq!(issues.len(), 5);
    assert!(issues[0].contains("customer-context.yaml"));
    assert!(issues[0].contains(expected));
}

#[test]
fn test_structure_reports_tracked_but_missing_spec() {
    let dir = tempfile::tempdir().unwrap();
    let issues = collect_structure_issues(
        dir.path(),
        &tracked(&["api/openapi/customer-context.yaml"]),
        &PolicyTables::default(),
    );

    assert!(issues[0].contains("customer-context.yaml: required OpenAPI spec is missing"));
    assert_eq!(issues.len(), 5);
}

#[test]
fn test_structure_passes_for_concrete_paths() {
    let dir = tempfile::tempdir().unwrap();
    let names = [
        "customer-context.yaml",
        "loan-context.yaml",
        "payment-context.yaml",
        "risk-context.yaml",
        "compliance-context.yaml",
    ];
    for name in names {
        write_spec(
            dir.path(),
            &format!("api/openapi/{}", name),
            "openapi: 3.0.3\npaths:\n  /api/v1/example:\n    get:\n      summary: ok\n",
        );
    }
    let tracked_list: Vec<String> = names
        .iter()
        .map(|n| format!("api/openapi/{}", n))
        .collect();

    let issues = collect_structure_issues(dir.path(), &tracked_list, &PolicyTables::default());
    assert_eq!(issues, Vec::<String>::new());
}
