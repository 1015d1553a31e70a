//! Property-based tests for change classification and evaluation
//!
//! Uses proptest to generate random change sets and verify invariants

use govgate::{evaluate_context, PolicyTables, ValidationContext};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_deleted_files_are_never_blocked(paths in path_list()) {
        let tables = PolicyTables::default();
        // every changed file is also deleted: removal is always remediation
        prop_assert!(tables.restricted.blocked_changes(&paths, &paths).is_empty());
        prop_assert!(tables.deprecated_roots.blocked_changes(&paths, &paths).is_empty());
        prop_assert!(tables.shared_foundation.blocked_changes(&paths, &paths).is_empty());
    }

    #[test]
    fn test_blocked_is_a_subset_of_changed_and_in_scope(changed in path_list(), deleted in path_list()) {
        let tables = PolicyTables::default();
        let blocked = tables.restricted.blocked_changes(&changed, &deleted);
        for path in &blocked {
            prop_assert!(changed.contains(path));
            prop_assert!(tables.restricted.in_scope(path));
            prop_assert!(!tables.restricted.is_exception(path));
            prop_assert!(!deleted.contains(path));
        }
    }

    #[test]
    fn test_exceptions_are_never_blocked(deleted in path_list()) {
        let tables = PolicyTables::default();
        let exceptions = tables.restricted.exceptions.clone();
        prop_assert!(tables.restricted.blocked_changes(&exceptions, &deleted).is_empty());
    }

    #[test]
    fn test_exit_code_reflects_errors_only(ctx in any_context()) {
        let result = evaluate_context(&PolicyTables::default(), &ctx);
        prop_assert_eq!(result.exit_code() == 0, result.errors.is_empty());
        // warnings alone never fail the run
        if result.errors.is_empty() {
            prop_assert!(result.passed());
        }
    }

    #[test]
    fn test_pass_line_appears_iff_no_errors(ctx in any_context()) {
        let result = evaluate_context(&PolicyTables::default(), &ctx);
        let report = result.to_report();
        prop_assert_eq!(
            report.contains("Repository governance checks passed."),
            result.errors.is_empty()
        );
    }

    #[test]
    fn test_evaluation_is_idempotent(ctx in any_context()) {
        let tables = PolicyTables::default();
        let first = evaluate_context(&tables, &ctx);
        let second = evaluate_context(&tables, &ctx);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_all_override_flags_leave_only_warnings(changed in path_list(), tracked in path_list()) {
        let ctx = ValidationContext {
            changed_files: changed,
            tracked_files: tracked,
            allow_legacy_path_edits: true,
            allow_deprecated_root_changes: true,
            allow_shared_foundation_change: true,
            ..Default::default()
        };
        let result = evaluate_context(&PolicyTables::default(), &ctx);
        prop_assert!(result.errors.is_empty());
    }
}

fn path_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("archive/tool.txt".to_string()),
            Just("archive/README.md".to_string()),
            Just("temp-src/scratch.java".to_string()),
            Just("loan-service/build.gradle".to_string()),
            Just("loan-service/README.md".to_string()),
            Just("bankwide/settings.txt".to_string()),
            Just("shared-kernel/src/main/java/K.java".to_string()),
            Just("docs/architecture/adr/ADR-007-split.md".to_string()),
            Just("docs/guide.md".to_string()),
            Just("open-finance-context/src/main/java/App.java".to_string()),
        ],
        0..8,
    )
}

fn any_context() -> impl Strategy<Value = ValidationContext> {
    (
        path_list(),
        path_list(),
        path_list(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(changed, deleted, tracked, allow_legacy, allow_deprecated, allow_shared, strict)| {
                ValidationContext {
                    changed_files: changed,
                    deleted_files: deleted,
                    tracked_files: tracked,
                    allow_legacy_path_edits: allow_legacy,
                    allow_deprecated_root_changes: allow_deprecated,
                    allow_shared_foundation_change: allow_shared,
                    strict_deprecated_roots: strict,
                    ..Default::default()
                }
            },
        )
}
